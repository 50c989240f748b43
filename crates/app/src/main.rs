use dioxus::prelude::*;
use session::SessionStore;
use shared_types::SessionState;

mod auth;
mod routes;
use auth::SessionContext;
use routes::Route;

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    let state = use_signal(SessionState::starting);

    // One store per app instance. The driver and the state bridge live as
    // long as the root component.
    let store = use_hook(move || start_session(state));

    {
        let store = store.clone();
        use_drop(move || store.teardown());
    }

    use_context_provider(|| SessionContext { store, state });

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }
        Router::<Route> {}
    }
}

/// Connect the configured backend, spawn the session driver and mirror its
/// state into `state`.
fn start_session(mut state: Signal<SessionState>) -> SessionStore {
    let mode = backend::backend_mode();
    let (store, driver) = backend::connect(&mode).start_session();
    spawn(driver.run());

    let mut updates = store.subscribe();
    spawn(async move {
        loop {
            let snapshot = (*updates.borrow_and_update()).clone();
            state.set(snapshot);
            if updates.changed().await.is_err() {
                tracing::debug!("Session state bridge closed");
                break;
            }
        }
    });

    store
}
