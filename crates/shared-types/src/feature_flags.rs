use serde::{Deserialize, Serialize};

/// Feature flags controlling optional behaviour.
///
/// Loaded from `config.toml` at startup. Every field defaults to `false` so
/// a missing or incomplete config file leaves the app on the hosted backend.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FeatureFlags {
    /// Run against the in-memory backend with a seeded demo account.
    #[serde(default)]
    pub development_mode: bool,
}

/// Hosted backend coordinates. Environment variables take precedence.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BackendSettings {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub anon_key: Option<String>,
    /// Where the signed-in session is kept between launches.
    #[serde(default)]
    pub session_file: Option<String>,
}

/// Top-level config file structure matching `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub features: FeatureFlags,
    #[serde(default)]
    pub backend: BackendSettings,
}
