use super::{error_message, SupabaseClient};
use async_trait::async_trait;
use serde::Deserialize;
use session::ProfileStore;
use shared_types::{NewProfile, ProfileError, UserProfile};

const USERS_TABLE: &str = "users";

/// Ask PostgREST for a single object instead of an array.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// PostgREST: `.single()` matched zero rows.
const NO_ROWS: &str = "PGRST116";
/// Postgres: unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Default, Deserialize)]
struct RestErrorBody {
    #[serde(default)]
    code: Option<String>,
}

/// Map a PostgREST error response to a `ProfileError`.
pub fn classify_rest_error(status: u16, body: &str) -> ProfileError {
    let code = serde_json::from_str::<RestErrorBody>(body)
        .unwrap_or_default()
        .code;
    let message = error_message(body).unwrap_or_else(|| format!("HTTP {status}"));

    match code.as_deref() {
        Some(NO_ROWS) => ProfileError::NotFound,
        Some(UNIQUE_VIOLATION) => ProfileError::Conflict(message),
        _ if status == 409 => ProfileError::Conflict(message),
        _ => ProfileError::Database(format!("{status}: {message}")),
    }
}

fn transport(e: reqwest::Error) -> ProfileError {
    ProfileError::Database(e.to_string())
}

impl SupabaseClient {
    async fn read_row(&self, response: reqwest::Response) -> Result<UserProfile, ProfileError> {
        let status = response.status();
        let text = response.text().await.map_err(transport)?;
        if !status.is_success() {
            return Err(classify_rest_error(status.as_u16(), &text));
        }
        serde_json::from_str(&text)
            .map_err(|e| ProfileError::Database(format!("unreadable users row: {e}")))
    }
}

#[async_trait]
impl ProfileStore for SupabaseClient {
    #[tracing::instrument(skip(self))]
    async fn fetch_profile(&self, id: &str) -> Result<UserProfile, ProfileError> {
        let url = format!(
            "{}?id=eq.{}&select=*",
            self.rest_url(USERS_TABLE),
            urlencoding::encode(id)
        );
        let bearer = self.bearer().await;
        let response = self
            .http
            .get(url)
            .header("apikey", &self.anon_key)
            .header("Authorization", bearer)
            .header("Accept", SINGLE_OBJECT)
            .send()
            .await
            .map_err(transport)?;
        self.read_row(response).await
    }

    #[tracing::instrument(skip(self, profile), fields(user_id = %profile.id))]
    async fn insert_profile(&self, profile: &NewProfile) -> Result<UserProfile, ProfileError> {
        let bearer = self.bearer().await;
        let response = self
            .http
            .post(self.rest_url(USERS_TABLE))
            .header("apikey", &self.anon_key)
            .header("Authorization", bearer)
            .header("Accept", SINGLE_OBJECT)
            .header("Prefer", "return=representation")
            .json(profile)
            .send()
            .await
            .map_err(transport)?;
        self.read_row(response).await
    }
}
