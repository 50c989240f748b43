use dioxus::prelude::*;

use super::{EmptyCard, StatCard};

#[component]
pub fn TherapistDashboard() -> Element {
    rsx! {
        div { class: "dashboard",
            h1 { "Therapist Dashboard" }

            div { class: "stat-grid",
                StatCard { label: "Total Clients", value: "0" }
                StatCard { label: "Sessions Today", value: "0" }
                StatCard { label: "Notes This Week", value: "0" }
            }

            div { class: "dashboard-grid",
                EmptyCard { title: "Today's Sessions", message: "No sessions scheduled for today" }
                EmptyCard {
                    title: "My Clients",
                    message: "No clients assigned yet",
                    hint: "Contact admin for client assignments",
                }
                EmptyCard { title: "Recent Session Notes", message: "No session notes yet" }
            }
        }
    }
}
