pub mod dashboard;
pub mod login;
pub mod not_found;
pub mod pages;
pub mod register;
pub mod subscribe;

use crate::auth::use_session;
use dioxus::prelude::*;
use session::gate::{Decision, Render};
use session::nav::{nav_items, quick_actions};
use session::routes::navigate;
use session::AppRoute;

use dashboard::Dashboard;
use login::Login;
use not_found::NotFound;
use pages::{Admin, Journal, Messages, Notifications, Shop};
use register::Register;
use subscribe::Subscribe;

/// Application routes.
#[derive(Clone, Routable, Debug, PartialEq)]
pub enum Route {
    #[layout(AuthGuard)]
    #[route("/login")]
    Login {},
    #[route("/register")]
    Register {},
    #[layout(AppLayout)]
    #[route("/dashboard")]
    Dashboard {},
    #[route("/shop")]
    Shop {},
    #[route("/notifications")]
    Notifications {},
    #[route("/journal")]
    Journal {},
    #[route("/messages")]
    Messages {},
    #[route("/admin")]
    Admin {},
    #[route("/subscribe")]
    Subscribe {},
    #[end_layout]
    #[end_layout]
    #[route("/:..route")]
    NotFound { route: Vec<String> },
}

impl From<AppRoute> for Route {
    fn from(route: AppRoute) -> Self {
        match route {
            AppRoute::Login => Route::Login {},
            AppRoute::Register => Route::Register {},
            AppRoute::Dashboard => Route::Dashboard {},
            AppRoute::Shop => Route::Shop {},
            AppRoute::Notifications => Route::Notifications {},
            AppRoute::Journal => Route::Journal {},
            AppRoute::Messages => Route::Messages {},
            AppRoute::Admin => Route::Admin {},
            AppRoute::Subscribe => Route::Subscribe {},
        }
    }
}

/// Gate every route through the session: loading placeholder while the
/// profile resolves, redirect when denied, the page otherwise.
#[component]
fn AuthGuard() -> Element {
    let session = use_session();
    let route = use_route::<Route>();
    let target = AppRoute::from_path(&route.to_string());
    let decision = navigate(&session.state.read(), target);

    match decision {
        Decision::Allow(Render::Content) => rsx! { Outlet::<Route> {} },
        Decision::Allow(Render::Loading) => rsx! {
            div { class: "auth-guard-loading",
                div { class: "spinner" }
                p { "Loading UnifiedCare..." }
            }
        },
        Decision::Redirect(redirect) => {
            tracing::debug!(from = target.path(), to = redirect.to, reason = ?redirect.reason, "Redirecting");
            navigator().replace(Route::from(AppRoute::from_path(redirect.to)));
            rsx! {
                div { class: "auth-guard-loading",
                    p { "Redirecting..." }
                }
            }
        }
    }
}

/// Main app layout with header and role-specific sidebar.
#[component]
fn AppLayout() -> Element {
    let session = use_session();
    let store = session.store.clone();
    let mut sign_out_error = use_signal(|| Option::<String>::None);
    let Some(profile) = session.profile() else {
        return rsx! { Outlet::<Route> {} };
    };

    let items = nav_items(profile.role);
    let actions = quick_actions(&profile);
    let display_name = profile.display_name();
    let role_label = profile.role.label();
    let role_class = format!("role-badge role-{}", profile.role.as_str());

    let handle_sign_out = move |_| {
        let store = store.clone();
        async move {
            match store.sign_out().await {
                Ok(()) => {
                    navigator().push(Route::Login {});
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Sign-out failed");
                    sign_out_error.set(Some("Could not sign out. Please try again.".to_string()));
                }
            }
        }
    };

    rsx! {
        div { class: "app-shell",
            header { class: "app-header",
                Link { to: Route::Dashboard {}, class: "app-logo", "UnifiedCare" }
                nav { class: "app-header-nav",
                    Link { to: Route::Dashboard {}, "Home" }
                    Link { to: Route::Messages {}, "Messages" }
                    Link { to: Route::Shop {}, "Shop" }
                    Link { to: Route::Notifications {}, "Notifications" }
                }
                div { class: "app-header-user",
                    span { class: "app-header-name", "{display_name}" }
                    span { class: "{role_class}", "{role_label}" }
                    button { class: "button button-ghost", onclick: handle_sign_out, "Sign Out" }
                }
            }
            if let Some(err) = sign_out_error() {
                div { class: "auth-error", "{err}" }
            }
            div { class: "app-body",
                aside { class: "app-sidebar",
                    ul { class: "sidebar-menu",
                        for item in items.iter() {
                            li { key: "{item.path}",
                                Link { to: Route::from(AppRoute::from_path(item.path)), "{item.label}" }
                            }
                        }
                    }
                    div { class: "sidebar-quick-actions",
                        if let Some(tel) = actions.emergency_call.clone() {
                            a { class: "button button-danger", href: "{tel}", "Emergency Call" }
                        }
                        if actions.shop {
                            Link { to: Route::Shop {}, class: "button", "Shop" }
                        }
                    }
                }
                main { class: "app-main", Outlet::<Route> {} }
            }
        }
    }
}
