use shared_types::AppConfig;
use std::path::PathBuf;
use std::sync::OnceLock;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Path to the config file, relative to the project root.
const CONFIG_PATH: &str = "config.toml";

const URL_VAR: &str = "SUPABASE_URL";
const ANON_KEY_VAR: &str = "SUPABASE_ANON_KEY";
const DEVELOPMENT_VAR: &str = "CARE_DEVELOPMENT_MODE";
const SESSION_FILE_VAR: &str = "CARE_SESSION_FILE";

/// Session file used when neither the environment nor the config names one.
pub const DEFAULT_SESSION_FILE: &str = ".unifiedcare/session.json";

/// Which backend the session store talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendMode {
    Hosted {
        url: String,
        anon_key: String,
        session_file: PathBuf,
    },
    /// In-memory backend seeded with a demo account.
    Development,
}

/// Read `config.toml` once and keep it for the life of the process.
///
/// A missing or unparseable file yields the defaults.
pub fn load_config() -> &'static AppConfig {
    CONFIG.get_or_init(|| match std::fs::read_to_string(CONFIG_PATH) {
        Ok(contents) => parse_config(&contents),
        Err(e) => {
            tracing::debug!(path = CONFIG_PATH, error = %e, "Config file not found, using defaults");
            AppConfig::default()
        }
    })
}

pub fn parse_config(contents: &str) -> AppConfig {
    let config: AppConfig = toml::from_str(contents).unwrap_or_else(|e| {
        tracing::warn!(path = CONFIG_PATH, error = %e, "Failed to parse config, using defaults");
        AppConfig::default()
    });
    tracing::debug!(features = ?config.features, "Loaded config");
    config
}

/// Pick the backend from `.env`, the process environment and `config.toml`.
pub fn backend_mode() -> BackendMode {
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(error = %e, "No .env file loaded");
    }
    resolve_mode(
        load_config(),
        std::env::var(URL_VAR).ok(),
        std::env::var(ANON_KEY_VAR).ok(),
        std::env::var(DEVELOPMENT_VAR).ok().as_deref().and_then(parse_flag),
        std::env::var(SESSION_FILE_VAR).ok(),
    )
}

/// Environment values win over the config file. Development mode is used
/// when requested or when either hosted coordinate is missing.
pub fn resolve_mode(
    config: &AppConfig,
    url: Option<String>,
    anon_key: Option<String>,
    development: Option<bool>,
    session_file: Option<String>,
) -> BackendMode {
    if development.unwrap_or(config.features.development_mode) {
        tracing::info!("Development mode enabled, using in-memory backend");
        return BackendMode::Development;
    }

    let url = non_empty(url).or_else(|| non_empty(config.backend.url.clone()));
    let anon_key = non_empty(anon_key).or_else(|| non_empty(config.backend.anon_key.clone()));
    match (url, anon_key) {
        (Some(url), Some(anon_key)) => BackendMode::Hosted {
            url: url.trim_end_matches('/').to_string(),
            anon_key,
            session_file: non_empty(session_file)
                .or_else(|| non_empty(config.backend.session_file.clone()))
                .unwrap_or_else(|| DEFAULT_SESSION_FILE.to_string())
                .into(),
        },
        _ => {
            tracing::warn!(
                "{URL_VAR} or {ANON_KEY_VAR} is not configured, falling back to development mode"
            );
            BackendMode::Development
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
