use backend::{BackendHandles, MemoryBackend};
use chrono::Utc;
use session::SessionStore;
use shared_types::{Identity, NewProfile, Role, SessionState, UserProfile};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Upper bound for any single wait on the session driver.
const WAIT: Duration = Duration::from_secs(5);

pub const PASSWORD: &str = "correct-horse";

/// Start a session store over `backend` and wait for its initial state.
///
/// The returned `JoinHandle` is the driver task.
pub async fn test_session(
    backend: MemoryBackend,
) -> (SessionStore, Arc<MemoryBackend>, JoinHandle<()>) {
    let backend = Arc::new(backend);
    let (store, driver) = BackendHandles::from_backend(backend.clone()).start_session();
    let handle = tokio::spawn(driver.run());
    settled(&store).await;
    (store, backend, handle)
}

/// Register a credential and, unless `role` is `None`, its profile row.
pub fn seed_user(
    backend: &MemoryBackend,
    email: &str,
    role: Option<Role>,
    subscribed: bool,
) -> Identity {
    let identity = backend.add_account(email, PASSWORD);
    if let Some(role) = role {
        backend.put_profile(profile_for(&identity, role, subscribed));
    }
    identity
}

pub fn profile_for(identity: &Identity, role: Role, subscribed: bool) -> UserProfile {
    let mut profile = NewProfile::provisioned_for(identity).into_profile(Utc::now());
    profile.role = role;
    profile.is_subscribed = subscribed;
    profile
}

pub async fn settled(store: &SessionStore) -> SessionState {
    tokio::time::timeout(WAIT, store.settled())
        .await
        .expect("timed out waiting for the session to settle")
        .expect("session driver stopped")
}

pub async fn wait_until(
    store: &SessionStore,
    condition: impl Fn(&SessionState) -> bool,
) -> SessionState {
    let mut states = store.subscribe();
    let state = tokio::time::timeout(WAIT, states.wait_for(|state| condition(state)))
        .await
        .expect("timed out waiting for session state")
        .expect("session driver stopped");
    (*state).clone()
}

/// Record every state the store publishes from now on.
pub fn record_states(store: &SessionStore) -> Arc<Mutex<Vec<SessionState>>> {
    let seen = Arc::new(Mutex::new(vec![store.state()]));
    let mut states = store.subscribe();
    let sink = seen.clone();
    tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = (*states.borrow_and_update()).clone();
            sink.lock().unwrap().push(state);
        }
    });
    seen
}
