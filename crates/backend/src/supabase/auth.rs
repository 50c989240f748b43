use super::{error_message, StoredSession, SupabaseClient};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::json;
use session::{AuthProvider, AuthSubscription};
use shared_types::{AuthError, AuthEvent, Identity, SignUpOutcome};

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl GoTrueUser {
    fn into_identity(self) -> Identity {
        Identity::new(self.id, self.email.unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
struct GoTrueSession {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    user: GoTrueUser,
}

impl GoTrueSession {
    fn into_stored(self) -> StoredSession {
        StoredSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: Utc::now() + Duration::seconds(self.expires_in),
            identity: self.user.into_identity(),
        }
    }
}

/// Sign-up answers with a session when email confirmation is off, and with
/// the bare user when it is on.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(GoTrueSession),
    User(GoTrueUser),
}

/// Map a GoTrue error response to an `AuthError`.
pub fn classify_auth_error(status: u16, body: &str) -> AuthError {
    let message = error_message(body);
    let invalid_grant = body.contains("invalid_grant")
        || message
            .as_deref()
            .is_some_and(|m| m.contains("Invalid login credentials"));
    if status == 400 && invalid_grant {
        return AuthError::InvalidCredentials;
    }
    AuthError::Provider {
        status,
        message: message.unwrap_or_else(|| format!("HTTP {status}")),
    }
}

fn transport(e: reqwest::Error) -> AuthError {
    AuthError::Network(e.to_string())
}

impl SupabaseClient {
    /// POST to a GoTrue endpoint and decode the success body.
    async fn auth_post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, AuthError> {
        let response = self
            .http
            .post(self.auth_url(path))
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let text = response.text().await.map_err(transport)?;
        if !status.is_success() {
            return Err(classify_auth_error(status.as_u16(), &text));
        }
        serde_json::from_str(&text).map_err(|e| AuthError::Decode(e.to_string()))
    }

    /// Exchange the refresh token for a new session, announcing it as
    /// `TOKEN_REFRESHED`. A rejected refresh token ends the session.
    #[tracing::instrument(skip(self))]
    pub async fn refresh_session(&self) -> Result<Option<Identity>, AuthError> {
        let _refreshing = self.refresh.lock().await;
        match self.stored() {
            Some(current) => self.exchange_refresh_token(current).await,
            None => Ok(None),
        }
    }

    /// Caller holds the refresh lock.
    pub(super) async fn exchange_refresh_token(
        &self,
        current: StoredSession,
    ) -> Result<Option<Identity>, AuthError> {
        let result: Result<GoTrueSession, AuthError> = self
            .auth_post(
                "token?grant_type=refresh_token",
                json!({ "refresh_token": current.refresh_token }),
            )
            .await;

        match result {
            Ok(session) => {
                let stored = session.into_stored();
                let identity = stored.identity.clone();
                self.store_session(Some(stored));
                tracing::debug!(user_id = %identity.id, "Access token refreshed");
                self.emit(AuthEvent::token_refreshed(identity.clone()));
                Ok(Some(identity))
            }
            Err(AuthError::Network(e)) => Err(AuthError::Network(e)),
            Err(err) => {
                tracing::warn!(error = %err, "Refresh token rejected, ending session");
                self.store_session(None);
                self.emit(AuthEvent::signed_out());
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl AuthProvider for SupabaseClient {
    async fn get_session(&self) -> Result<Option<Identity>, AuthError> {
        Ok(self
            .current_session()
            .await?
            .map(|session| session.identity))
    }

    fn on_auth_state_change(&self) -> AuthSubscription {
        AuthSubscription::new(self.events.subscribe())
    }

    #[tracing::instrument(skip(self, password))]
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let session: GoTrueSession = self
            .auth_post(
                "token?grant_type=password",
                json!({ "email": email, "password": password }),
            )
            .await?;

        let stored = session.into_stored();
        let identity = stored.identity.clone();
        self.store_session(Some(stored));
        self.emit(AuthEvent::signed_in(identity.clone()));
        Ok(identity)
    }

    #[tracing::instrument(skip(self, password))]
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let response: SignUpResponse = self
            .auth_post("signup", json!({ "email": email, "password": password }))
            .await?;

        match response {
            SignUpResponse::Session(session) => {
                let stored = session.into_stored();
                let identity = stored.identity.clone();
                self.store_session(Some(stored));
                self.emit(AuthEvent::signed_in(identity.clone()));
                Ok(SignUpOutcome::SignedIn(identity))
            }
            SignUpResponse::User(user) => {
                tracing::info!(user_id = %user.id, "Account created, awaiting email confirmation");
                Ok(SignUpOutcome::AwaitingConfirmation(user.into_identity()))
            }
        }
    }

    #[tracing::instrument(skip(self))]
    async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(current) = self.stored() else {
            self.emit(AuthEvent::signed_out());
            return Ok(());
        };

        let response = self
            .http
            .post(self.auth_url("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(&current.access_token)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        // 401/404: the token is already invalid server-side, so the session is gone either way.
        if !status.is_success() && status.as_u16() != 401 && status.as_u16() != 404 {
            let text = response.text().await.map_err(transport)?;
            return Err(classify_auth_error(status.as_u16(), &text));
        }

        self.store_session(None);
        self.emit(AuthEvent::signed_out());
        Ok(())
    }
}
