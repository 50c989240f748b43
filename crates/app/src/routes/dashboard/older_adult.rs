use dioxus::prelude::*;

use super::EmptyCard;
use crate::auth::use_profile;
use crate::routes::Route;

#[component]
pub fn OlderAdultDashboard() -> Element {
    let profile = use_profile();
    let first_name = profile.as_ref().map(|p| p.first_name.clone()).unwrap_or_default();
    let has_caregiver = profile
        .as_ref()
        .is_some_and(|p| p.assigned_caregiver_id.is_some());
    let subscribed = profile.as_ref().is_some_and(|p| p.is_subscribed);

    rsx! {
        div { class: "dashboard",
            h1 { "Welcome back, {first_name}" }
            p { class: "dashboard-subtitle", "Maintain wellness, one day at a time." }

            if !subscribed {
                div { class: "notice",
                    p { "Subscribe to a care plan to unlock your journal and messages." }
                    Link { to: Route::Subscribe {}, class: "button", "View Plans" }
                }
            }

            div { class: "dashboard-grid",
                EmptyCard { title: "Care Plan", message: "No care plan set up yet" }
                EmptyCard { title: "Daily Journal", message: "No entry for today" }
                if has_caregiver {
                    EmptyCard { title: "My Caregiver", message: "Available today" }
                } else {
                    EmptyCard {
                        title: "My Caregiver",
                        message: "No caregiver assigned",
                        hint: "Contact admin for assignment",
                    }
                }
                EmptyCard { title: "Recent Orders", message: "No orders yet" }
            }
        }
    }
}
