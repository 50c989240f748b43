pub mod admin;
pub mod caregiver;
pub mod older_adult;
pub mod therapist;

use dioxus::prelude::*;
use session::{route_profile, Dashboard as DashboardVariant, RoleRoute};

use crate::auth::use_profile;
use crate::routes::Route;

/// Role-adaptive dashboard: renders the dashboard for the user's role.
#[component]
pub fn Dashboard() -> Element {
    let profile = use_profile();

    let variant = match route_profile(profile.as_ref()) {
        RoleRoute::Dashboard(variant) => variant,
        RoleRoute::Redirect(_) => {
            navigator().replace(Route::Login {});
            return rsx! {};
        }
    };
    let title = variant.title();

    rsx! {
        document::Title { "{title} | UnifiedCare" }
        match variant {
            DashboardVariant::OlderAdult => rsx! { older_adult::OlderAdultDashboard {} },
            DashboardVariant::Caregiver => rsx! { caregiver::CaregiverDashboard {} },
            DashboardVariant::Therapist => rsx! { therapist::TherapistDashboard {} },
            DashboardVariant::Admin => rsx! { admin::AdminDashboard {} },
        }
    }
}

/// Summary tile.
#[component]
fn StatCard(label: String, value: String) -> Element {
    rsx! {
        div { class: "stat-card",
            p { class: "stat-card-label", "{label}" }
            p { class: "stat-card-value", "{value}" }
        }
    }
}

/// Card with a title and an empty-state message.
#[component]
fn EmptyCard(title: String, message: String, hint: Option<String>) -> Element {
    rsx! {
        section { class: "card",
            h2 { class: "card-title", "{title}" }
            p { class: "card-empty", "{message}" }
            if let Some(hint) = hint {
                p { class: "card-hint", "{hint}" }
            }
        }
    }
}
