//! Capability interface to the hosted auth/database service.

use async_trait::async_trait;
use shared_types::{
    AuthError, AuthEvent, Identity, NewProfile, ProfileError, SignUpOutcome, UserProfile,
};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Credential operations and auth state notifications.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The session the provider already holds, if any.
    async fn get_session(&self) -> Result<Option<Identity>, AuthError>;

    /// Subscribe to auth state changes. Dropping the subscription unsubscribes.
    fn on_auth_state_change(&self) -> AuthSubscription;

    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> Result<Identity, AuthError>;

    /// Create a credential. When the provider requires email confirmation the
    /// account exists but no session is started.
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// The `users` table, keyed by identity id.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch the row for `id`. A missing row is `ProfileError::NotFound`.
    async fn fetch_profile(&self, id: &str) -> Result<UserProfile, ProfileError>;

    /// Insert a row and return it as stored. An existing row for the same id
    /// is `ProfileError::Conflict`.
    async fn insert_profile(&self, profile: &NewProfile) -> Result<UserProfile, ProfileError>;
}

/// Handle to a provider's auth event stream.
pub struct AuthSubscription {
    receiver: broadcast::Receiver<AuthEvent>,
}

impl AuthSubscription {
    pub fn new(receiver: broadcast::Receiver<AuthEvent>) -> Self {
        Self { receiver }
    }

    /// Next event, or `None` once the provider has gone away.
    ///
    /// A subscriber that fell behind skips the overwritten events; only the
    /// most recent ones describe the provider's current session anyway.
    pub async fn recv(&mut self) -> Option<AuthEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Auth event subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Stop receiving events.
    pub fn unsubscribe(self) {
        drop(self.receiver);
    }
}
