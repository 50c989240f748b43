use crate::auth::use_session;
use crate::routes::Route;
use dioxus::prelude::*;
use shared_types::{AppError, SignInRequest};
use std::collections::HashMap;
use validator::Validate;

/// Email/password sign-in page.
#[component]
pub fn Login() -> Element {
    let session = use_session();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error_msg = use_signal(|| Option::<String>::None);
    let mut field_errors = use_signal(HashMap::<String, String>::new);
    let mut loading = use_signal(|| false);

    let handle_login = move |evt: FormEvent| {
        let store = session.store.clone();
        async move {
            evt.prevent_default();
            error_msg.set(None);
            field_errors.set(HashMap::new());

            let req = SignInRequest {
                email: email().trim().to_string(),
                password: password(),
            };
            if let Err(e) = req.validate() {
                field_errors.set(AppError::from(e).field_errors);
                return;
            }

            loading.set(true);
            match store.sign_in(&req.email, &req.password).await {
                Ok(()) => {
                    navigator().push(Route::Dashboard {});
                }
                Err(e) => {
                    tracing::info!(error = %e, "Sign-in rejected");
                    error_msg.set(Some(e.user_message().to_string()));
                }
            }
            loading.set(false);
        }
    };

    rsx! {
        div { class: "auth-page",
            div { class: "auth-card",
                h1 { class: "auth-title", "Welcome to UnifiedCare" }
                p { class: "auth-subtitle", "Sign in to your account" }

                if let Some(err) = error_msg() {
                    div { class: "auth-error", "{err}" }
                }

                form { onsubmit: handle_login,
                    div { class: "auth-field",
                        label { r#for: "email", "Email" }
                        input {
                            r#type: "email",
                            id: "email",
                            placeholder: "you@example.com",
                            value: email(),
                            oninput: move |e: FormEvent| email.set(e.value()),
                        }
                        if let Some(err) = field_errors().get("email") {
                            div { class: "auth-field-error", "{err}" }
                        }
                    }
                    div { class: "auth-field",
                        label { r#for: "password", "Password" }
                        input {
                            r#type: "password",
                            id: "password",
                            placeholder: "Enter your password",
                            value: password(),
                            oninput: move |e: FormEvent| password.set(e.value()),
                        }
                        if let Some(err) = field_errors().get("password") {
                            div { class: "auth-field-error", "{err}" }
                        }
                    }
                    button {
                        r#type: "submit",
                        class: "auth-submit button",
                        disabled: loading(),
                        if loading() { "Signing in..." } else { "Sign In" }
                    }
                }

                p { class: "auth-link",
                    "Don't have an account? "
                    Link { to: Route::Register {}, "Sign up" }
                }
            }
        }
    }
}
