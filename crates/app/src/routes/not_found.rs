use dioxus::prelude::*;

use crate::routes::Route;

/// Unknown paths land on the dashboard, which the guard then resolves.
#[component]
pub fn NotFound(route: Vec<String>) -> Element {
    let path = format!("/{}", route.join("/"));
    tracing::debug!(%path, "Unknown route");
    navigator().replace(Route::Dashboard {});

    rsx! {
        div { class: "auth-guard-loading",
            p { "Redirecting..." }
        }
    }
}
