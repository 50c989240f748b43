use dioxus::prelude::*;

use super::{EmptyCard, StatCard};

#[component]
pub fn AdminDashboard() -> Element {
    rsx! {
        div { class: "dashboard",
            h1 { "Admin Dashboard" }
            p { class: "dashboard-subtitle", "System overview and management" }

            div { class: "stat-grid",
                StatCard { label: "Total Users", value: "0" }
                StatCard { label: "Products", value: "0" }
                StatCard { label: "Total Orders", value: "0" }
                StatCard { label: "Subscriptions", value: "0" }
            }

            div { class: "dashboard-grid",
                EmptyCard { title: "Recent Users", message: "No users found" }
                EmptyCard { title: "Recent Orders", message: "No orders found" }
            }
        }
    }
}
