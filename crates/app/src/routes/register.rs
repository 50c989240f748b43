use crate::auth::use_session;
use crate::routes::Route;
use dioxus::prelude::*;
use shared_types::{AppError, Role, SignUpError, SignUpRequest};
use std::collections::HashMap;
use validator::Validate;

/// Roles a visitor may pick for themselves. Admins are provisioned by hand.
const SELF_SERVICE_ROLES: [Role; 3] = [Role::OlderAdult, Role::Caregiver, Role::Therapist];

/// Registration page: credential plus the profile fields of the new user.
#[component]
pub fn Register() -> Element {
    let session = use_session();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut first_name = use_signal(String::new);
    let mut last_name = use_signal(String::new);
    let mut phone = use_signal(String::new);
    let mut role = use_signal(|| Role::OlderAdult);
    let mut error_msg = use_signal(|| Option::<String>::None);
    let mut notice = use_signal(|| Option::<String>::None);
    let mut field_errors = use_signal(HashMap::<String, String>::new);
    let mut loading = use_signal(|| false);

    let handle_register = move |evt: FormEvent| {
        let store = session.store.clone();
        async move {
            evt.prevent_default();
            error_msg.set(None);
            notice.set(None);
            field_errors.set(HashMap::new());

            let phone = phone();
            let req = SignUpRequest {
                email: email().trim().to_string(),
                password: password(),
                first_name: first_name().trim().to_string(),
                last_name: last_name().trim().to_string(),
                phone: (!phone.trim().is_empty()).then(|| phone.trim().to_string()),
                role: Some(role()),
            };
            if let Err(e) = req.validate() {
                field_errors.set(AppError::from(e).field_errors);
                return;
            }

            loading.set(true);
            match store
                .sign_up(&req.email, &req.password, req.profile_fields())
                .await
            {
                Ok(registration) if registration.awaiting_confirmation => {
                    tracing::info!(user_id = %registration.profile.id, "Registered, awaiting email confirmation");
                    notice.set(Some(
                        "Check your email to confirm your account, then sign in.".to_string(),
                    ));
                }
                Ok(registration) => {
                    let profile = registration.profile;
                    tracing::info!(user_id = %profile.id, role = profile.role.as_str(), "Registered");
                    navigator().push(Route::Dashboard {});
                }
                Err(e) => {
                    if let SignUpError::ProfileCreation { identity, source } = &e {
                        tracing::error!(user_id = %identity.id, error = %source, "Profile creation failed after sign-up");
                    }
                    error_msg.set(Some(AppError::from(e).message));
                }
            }
            loading.set(false);
        }
    };

    rsx! {
        div { class: "auth-page",
            div { class: "auth-card",
                h1 { class: "auth-title", "Create an Account" }
                p { class: "auth-subtitle", "Join UnifiedCare" }

                if let Some(err) = error_msg() {
                    div { class: "auth-error", "{err}" }
                }
                if let Some(message) = notice() {
                    div { class: "auth-notice", "{message}" }
                }

                form { onsubmit: handle_register,
                    div { class: "auth-field-row",
                        div { class: "auth-field",
                            label { r#for: "first_name", "First Name" }
                            input {
                                id: "first_name",
                                value: first_name(),
                                oninput: move |e: FormEvent| first_name.set(e.value()),
                            }
                            if let Some(err) = field_errors().get("first_name") {
                                div { class: "auth-field-error", "{err}" }
                            }
                        }
                        div { class: "auth-field",
                            label { r#for: "last_name", "Last Name" }
                            input {
                                id: "last_name",
                                value: last_name(),
                                oninput: move |e: FormEvent| last_name.set(e.value()),
                            }
                            if let Some(err) = field_errors().get("last_name") {
                                div { class: "auth-field-error", "{err}" }
                            }
                        }
                    }
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
                        label { r#for: "phone", "Phone (optional)" }
                        input {
                            r#type: "tel",
                            id: "phone",
                            value: phone(),
                            oninput: move |e: FormEvent| phone.set(e.value()),
                        }
                    }
                    div { class: "auth-field",
                        label { r#for: "role", "I am a..." }
                        select {
                            id: "role",
                            value: role().as_str(),
                            onchange: move |e: FormEvent| {
                                if let Some(r) = Role::parse_role(&e.value()) {
                                    role.set(r);
                                }
                            },
                            for r in SELF_SERVICE_ROLES {
                                option { key: "{r.as_str()}", value: r.as_str(), "{r.label()}" }
                            }
                        }
                    }
                    div { class: "auth-field",
                        label { r#for: "password", "Password" }
                        input {
                            r#type: "password",
                            id: "password",
                            placeholder: "At least 6 characters",
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
                        if loading() { "Creating account..." } else { "Create Account" }
                    }
                }

                p { class: "auth-link",
                    "Already have an account? "
                    Link { to: Route::Login {}, "Sign in" }
                }
            }
        }
    }
}
