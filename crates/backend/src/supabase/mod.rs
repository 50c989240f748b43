//! Hosted backend: Supabase GoTrue for credentials, PostgREST for the
//! `users` table.

mod auth;
mod rest;
mod session_file;

pub use auth::classify_auth_error;
pub use rest::classify_rest_error;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use session_file::SessionFile;
use shared_types::{AuthError, AuthEvent, Identity};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 32;

/// Refresh this long before the access token actually expires.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Tokens for the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoredSession {
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
    identity: Identity,
}

impl StoredSession {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }
}

pub struct SupabaseClient {
    http: reqwest::Client,
    url: String,
    anon_key: String,
    session: Mutex<Option<StoredSession>>,
    /// Held while exchanging the refresh token, which GoTrue accepts only once.
    refresh: tokio::sync::Mutex<()>,
    file: Option<SessionFile>,
    events: broadcast::Sender<AuthEvent>,
}

impl SupabaseClient {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            http: reqwest::Client::new(),
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            session: Mutex::new(None),
            refresh: tokio::sync::Mutex::new(()),
            file: None,
            events,
        }
    }

    /// Keep the session in `path` and restore whatever it already holds.
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        let file = SessionFile::new(path);
        if let Some(restored) = file.load() {
            tracing::debug!(user_id = %restored.identity.id, "Restored session from disk");
            *lock(&self.session) = Some(restored);
        }
        self.file = Some(file);
        self
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.url, path)
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.url, path)
    }

    /// Bearer token for PostgREST: the user's access token when signed in,
    /// the anon key otherwise. An expired token is refreshed first; if the
    /// refresh cannot reach GoTrue the old token is sent and PostgREST decides.
    async fn bearer(&self) -> String {
        let session = match self.current_session().await {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(error = %err, "Token refresh failed, sending the stored token");
                self.stored()
            }
        };
        let token = session
            .map(|session| session.access_token)
            .unwrap_or_else(|| self.anon_key.clone());
        format!("Bearer {token}")
    }

    /// The stored session, refreshed first when its access token has expired.
    async fn current_session(&self) -> Result<Option<StoredSession>, AuthError> {
        match self.stored() {
            Some(session) if session.is_expired(Utc::now()) => {}
            other => return Ok(other),
        }

        let _refreshing = self.refresh.lock().await;
        // Another caller may have refreshed while this one waited.
        match self.stored() {
            Some(session) if session.is_expired(Utc::now()) => {
                self.exchange_refresh_token(session).await?;
                Ok(self.stored())
            }
            other => Ok(other),
        }
    }

    fn stored(&self) -> Option<StoredSession> {
        lock(&self.session).clone()
    }

    fn store_session(&self, session: Option<StoredSession>) {
        if let Some(file) = &self.file {
            file.save(session.as_ref());
        }
        *lock(&self.session) = session;
    }

    fn emit(&self, event: AuthEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("No auth event subscribers");
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Human-readable message from a Supabase error body. GoTrue and PostgREST
/// use different field names for it.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|field| value.get(*field).and_then(|v| v.as_str()))
        .map(str::to_string)
}
