//! In-memory auth provider and `users` table.
//!
//! Backs development mode and the scenario tests. Failures and latency can be
//! injected per operation.

use async_trait::async_trait;
use chrono::Utc;
use session::{AuthProvider, AuthSubscription, ProfileStore};
use shared_types::{
    AuthError, AuthEvent, Identity, NewProfile, ProfileError, Role, SignUpOutcome, UserProfile,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;

pub const DEV_USER_ID: &str = "mock-user-123";
pub const DEV_EMAIL: &str = "test@example.com";
pub const DEV_PASSWORD: &str = "password123";

const MIN_PASSWORD_LEN: usize = 6;
const EVENT_CAPACITY: usize = 32;

struct Account {
    identity: Identity,
    password: String,
}

#[derive(Default)]
struct State {
    /// Keyed by lowercased email.
    accounts: HashMap<String, Account>,
    session: Option<Identity>,
    profiles: HashMap<String, UserProfile>,
    /// New accounts must confirm their email before a session starts.
    confirm_email: bool,
}

#[derive(Default)]
struct Faults {
    fetch: Option<ProfileError>,
    insert: Option<ProfileError>,
    sign_out: Option<AuthError>,
    /// Applied after the row is read, so concurrent readers all see the same snapshot.
    fetch_delays: HashMap<String, Duration>,
    /// Keyed by lowercased email.
    sign_in_delays: HashMap<String, Duration>,
    insert_delay: Option<Duration>,
}

pub struct MemoryBackend {
    state: Mutex<State>,
    faults: Mutex<Faults>,
    events: broadcast::Sender<AuthEvent>,
    insert_attempts: AtomicUsize,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Mutex::new(State::default()),
            faults: Mutex::new(Faults::default()),
            events,
            insert_attempts: AtomicUsize::new(0),
        }
    }

    /// Backend with a subscribed older adult already signed in.
    pub fn development() -> Self {
        let backend = Self::new();
        let identity = backend.add_account_with_id(DEV_USER_ID, DEV_EMAIL, DEV_PASSWORD);
        backend.put_profile(UserProfile {
            id: identity.id.clone(),
            email: identity.email.clone(),
            role: Role::OlderAdult,
            first_name: "John".into(),
            last_name: "Doe".into(),
            phone: None,
            is_subscribed: true,
            subscription_expires_at: None,
            assigned_caregiver_id: None,
            assigned_therapist_id: None,
            created_at: Utc::now(),
        });
        lock(&backend.state).session = Some(identity);
        tracing::info!(email = DEV_EMAIL, "Seeded development session");
        backend
    }

    // --- Seeding ---

    /// Register a credential with a generated id. No profile row is created.
    pub fn add_account(&self, email: &str, password: &str) -> Identity {
        self.add_account_with_id(&uuid::Uuid::new_v4().to_string(), email, password)
    }

    pub fn add_account_with_id(&self, id: &str, email: &str, password: &str) -> Identity {
        let identity = Identity::new(id, email);
        lock(&self.state).accounts.insert(
            email.to_lowercase(),
            Account {
                identity: identity.clone(),
                password: password.to_string(),
            },
        );
        identity
    }

    pub fn put_profile(&self, profile: UserProfile) {
        lock(&self.state).profiles.insert(profile.id.clone(), profile);
    }

    // --- Inspection ---

    pub fn profile(&self, id: &str) -> Option<UserProfile> {
        lock(&self.state).profiles.get(id).cloned()
    }

    pub fn profile_count(&self) -> usize {
        lock(&self.state).profiles.len()
    }

    pub fn current_session(&self) -> Option<Identity> {
        lock(&self.state).session.clone()
    }

    /// Insert calls seen so far, including rejected ones.
    pub fn insert_attempts(&self) -> usize {
        self.insert_attempts.load(Ordering::SeqCst)
    }

    // --- Fault injection ---

    pub fn fail_fetches(&self, error: Option<ProfileError>) {
        lock(&self.faults).fetch = error;
    }

    pub fn fail_inserts(&self, error: Option<ProfileError>) {
        lock(&self.faults).insert = error;
    }

    pub fn fail_sign_out(&self, error: Option<AuthError>) {
        lock(&self.faults).sign_out = error;
    }

    pub fn delay_fetch(&self, id: &str, delay: Duration) {
        lock(&self.faults).fetch_delays.insert(id.to_string(), delay);
    }

    /// Hold the credential check for `email` before answering.
    pub fn delay_sign_in(&self, email: &str, delay: Duration) {
        lock(&self.faults)
            .sign_in_delays
            .insert(email.trim().to_lowercase(), delay);
    }

    pub fn delay_inserts(&self, delay: Option<Duration>) {
        lock(&self.faults).insert_delay = delay;
    }

    // --- Provider settings ---

    /// Sign-ups create the account but start no session until the email is confirmed.
    pub fn require_email_confirmation(&self, required: bool) {
        lock(&self.state).confirm_email = required;
    }

    // --- Provider-side events ---

    /// The session ended outside this client, e.g. in another tab.
    pub fn sign_out_elsewhere(&self) {
        lock(&self.state).session = None;
        self.emit(AuthEvent::signed_out());
    }

    /// Re-announce the current session as a token refresh.
    pub fn refresh_token(&self) {
        let current = lock(&self.state).session.clone();
        if let Some(identity) = current {
            self.emit(AuthEvent::token_refreshed(identity));
        }
    }

    fn emit(&self, event: AuthEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("No auth event subscribers");
        }
    }

    fn start_session(&self, identity: &Identity) {
        lock(&self.state).session = Some(identity.clone());
        self.emit(AuthEvent::signed_in(identity.clone()));
    }
}

#[async_trait]
impl AuthProvider for MemoryBackend {
    async fn get_session(&self) -> Result<Option<Identity>, AuthError> {
        Ok(lock(&self.state).session.clone())
    }

    fn on_auth_state_change(&self) -> AuthSubscription {
        AuthSubscription::new(self.events.subscribe())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let email = email.trim().to_lowercase();
        let delay = lock(&self.faults).sign_in_delays.get(&email).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let identity = {
            let state = lock(&self.state);
            match state.accounts.get(&email) {
                Some(account) if account.password == password => account.identity.clone(),
                _ => return Err(AuthError::InvalidCredentials),
            }
        };
        self.start_session(&identity);
        Ok(identity)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::Provider {
                status: 422,
                message: format!("Password should be at least {MIN_PASSWORD_LEN} characters"),
            });
        }
        let email = email.trim().to_lowercase();
        let (identity, confirm_email) = {
            let mut state = lock(&self.state);
            if state.accounts.contains_key(&email) {
                return Err(AuthError::Provider {
                    status: 422,
                    message: "User already registered".into(),
                });
            }
            let identity = Identity::new(uuid::Uuid::new_v4().to_string(), email.clone());
            state.accounts.insert(
                email,
                Account {
                    identity: identity.clone(),
                    password: password.to_string(),
                },
            );
            (identity, state.confirm_email)
        };
        if confirm_email {
            return Ok(SignUpOutcome::AwaitingConfirmation(identity));
        }
        self.start_session(&identity);
        Ok(SignUpOutcome::SignedIn(identity))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if let Some(error) = lock(&self.faults).sign_out.clone() {
            return Err(error);
        }
        lock(&self.state).session = None;
        self.emit(AuthEvent::signed_out());
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryBackend {
    async fn fetch_profile(&self, id: &str) -> Result<UserProfile, ProfileError> {
        let (fault, delay) = {
            let faults = lock(&self.faults);
            (faults.fetch.clone(), faults.fetch_delays.get(id).copied())
        };
        if let Some(error) = fault {
            return Err(error);
        }

        let row = lock(&self.state).profiles.get(id).cloned();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        row.ok_or(ProfileError::NotFound)
    }

    async fn insert_profile(&self, profile: &NewProfile) -> Result<UserProfile, ProfileError> {
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);
        let (fault, delay) = {
            let faults = lock(&self.faults);
            (faults.insert.clone(), faults.insert_delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = fault {
            return Err(error);
        }

        let mut state = lock(&self.state);
        if state.profiles.contains_key(&profile.id) {
            return Err(ProfileError::Conflict(
                "duplicate key value violates unique constraint \"users_pkey\"".into(),
            ));
        }
        let row = profile.clone().into_profile(Utc::now());
        state.profiles.insert(row.id.clone(), row.clone());
        Ok(row)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
