use crate::auth::use_profile;
use dioxus::prelude::*;
use shared_types::{find_plan, SUBSCRIPTION_PLANS};

/// Care plan picker for older adults. Payment is not wired up yet, so
/// choosing a plan only records the selection.
#[component]
pub fn Subscribe() -> Element {
    let profile = use_profile();
    let mut selected = use_signal(|| Option::<&'static str>::None);
    let already_subscribed = profile.as_ref().is_some_and(|p| p.is_subscribed);

    rsx! {
        div { class: "subscribe-page",
            h1 { "Choose Your Care Plan" }
            p { class: "dashboard-subtitle",
                "Select the plan that best fits your needs."
            }

            if already_subscribed {
                div { class: "notice", p { "You already have an active subscription." } }
            }

            div { class: "plan-grid",
                for plan in SUBSCRIPTION_PLANS.iter() {
                    div {
                        key: "{plan.id}",
                        class: if plan.recommended { "plan-card plan-card-recommended" } else { "plan-card" },
                        if plan.recommended {
                            span { class: "plan-badge", "Recommended" }
                        }
                        h2 { class: "plan-name", "{plan.name}" }
                        p { class: "plan-price",
                            "{plan.display_price()}"
                            span { class: "plan-period", " {plan.period.price_suffix()}" }
                        }
                        ul { class: "plan-features",
                            for feature in plan.features.iter() {
                                li { key: "{feature}", "{feature}" }
                            }
                        }
                        button {
                            class: "button",
                            onclick: move |_| {
                                tracing::info!(plan = plan.id, "Plan selected");
                                selected.set(Some(plan.id));
                            },
                            "Choose Plan"
                        }
                    }
                }
            }

            if let Some(plan) = selected().and_then(find_plan) {
                div { class: "notice",
                    p { "Online payment for {plan.name} is coming soon. Our team will contact you to complete your subscription." }
                }
            }
        }
    }
}
