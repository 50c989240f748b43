use dioxus::prelude::*;

use super::{EmptyCard, StatCard};

#[component]
pub fn CaregiverDashboard() -> Element {
    rsx! {
        div { class: "dashboard",
            h1 { "Caregiver Dashboard" }

            div { class: "stat-grid",
                StatCard { label: "Total Clients", value: "0" }
                StatCard { label: "Tasks Completed", value: "0" }
                StatCard { label: "Pending Alerts", value: "0" }
            }

            div { class: "dashboard-grid",
                EmptyCard {
                    title: "My Clients",
                    message: "No clients assigned yet",
                    hint: "Contact admin for client assignments",
                }
                EmptyCard { title: "Today's Tasks", message: "No tasks scheduled for today" }
                EmptyCard {
                    title: "Recent Alerts",
                    message: "No pending alerts",
                    hint: "All clients are doing well!",
                }
            }
        }
    }
}
