//! Pages whose content lives outside the session core. Each renders its
//! frame so the guard and navigation can be exercised end to end.

use dioxus::prelude::*;
use session::AppRoute;

#[component]
fn Placeholder(route: AppRoute, message: String) -> Element {
    let title = route.title();
    rsx! {
        div { class: "page",
            h1 { "{title}" }
            p { class: "card-empty", "{message}" }
        }
    }
}

#[component]
pub fn Shop() -> Element {
    rsx! { Placeholder { route: AppRoute::Shop, message: "No products available yet" } }
}

#[component]
pub fn Notifications() -> Element {
    rsx! { Placeholder { route: AppRoute::Notifications, message: "You're all caught up" } }
}

#[component]
pub fn Journal() -> Element {
    rsx! { Placeholder { route: AppRoute::Journal, message: "No journal entries yet" } }
}

#[component]
pub fn Messages() -> Element {
    rsx! { Placeholder { route: AppRoute::Messages, message: "No messages yet" } }
}

#[component]
pub fn Admin() -> Element {
    rsx! { Placeholder { route: AppRoute::Admin, message: "Select a section from the sidebar" } }
}
