use crate::models::Identity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Categorization of application errors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum AppErrorKind {
    NotFound,
    ValidationError,
    Conflict,
    DatabaseError,
    Unauthenticated,
    Forbidden,
    SubscriptionRequired,
    InternalError,
}

impl fmt::Display for AppErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppErrorKind::NotFound => write!(f, "NotFound"),
            AppErrorKind::ValidationError => write!(f, "ValidationError"),
            AppErrorKind::Conflict => write!(f, "Conflict"),
            AppErrorKind::DatabaseError => write!(f, "DatabaseError"),
            AppErrorKind::Unauthenticated => write!(f, "Unauthenticated"),
            AppErrorKind::Forbidden => write!(f, "Forbidden"),
            AppErrorKind::SubscriptionRequired => write!(f, "SubscriptionRequired"),
            AppErrorKind::InternalError => write!(f, "InternalError"),
        }
    }
}

/// Structured error handed to the view layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub kind: AppErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub field_errors: HashMap<String, String>,
}

impl AppError {
    fn with_kind(kind: AppErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            field_errors: HashMap::new(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_kind(AppErrorKind::NotFound, message)
    }

    pub fn validation(message: impl Into<String>, field_errors: HashMap<String, String>) -> Self {
        Self {
            kind: AppErrorKind::ValidationError,
            message: message.into(),
            field_errors,
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::with_kind(AppErrorKind::Conflict, message)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::with_kind(AppErrorKind::DatabaseError, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::with_kind(AppErrorKind::Unauthenticated, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::with_kind(AppErrorKind::Forbidden, message)
    }

    pub fn subscription_required(message: impl Into<String>) -> Self {
        Self::with_kind(AppErrorKind::SubscriptionRequired, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_kind(AppErrorKind::InternalError, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for AppError {}

#[cfg(feature = "validation")]
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut field_errors = HashMap::new();
        for (field, errs) in errors.field_errors() {
            if let Some(first) = errs.first() {
                let msg = first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", field));
                field_errors.insert(field.to_string(), msg);
            }
        }
        AppError::validation("Validation failed", field_errors)
    }
}

/// Message shown for every failed sign-in, whatever the underlying cause.
pub const LOGIN_FAILED_MESSAGE: &str = "Invalid email or password. Please try again.";

/// Failure reported by the hosted auth provider.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    /// Email/password pair rejected.
    InvalidCredentials,
    /// The provider could not be reached.
    Network(String),
    /// The provider answered with an error status.
    Provider { status: u16, message: String },
    /// The provider answered with a body we could not read.
    Decode(String),
    /// The session driver has shut down and no longer accepts requests.
    SessionClosed,
}

impl AuthError {
    /// Text the login form shows. Deliberately identical for every cause.
    pub fn user_message(&self) -> &'static str {
        LOGIN_FAILED_MESSAGE
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "invalid login credentials"),
            AuthError::Network(msg) => write!(f, "auth provider unreachable: {msg}"),
            AuthError::Provider { status, message } => {
                write!(f, "auth provider error ({status}): {message}")
            }
            AuthError::Decode(msg) => write!(f, "unreadable auth response: {msg}"),
            AuthError::SessionClosed => write!(f, "session store is shut down"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::unauthenticated(LOGIN_FAILED_MESSAGE),
            other => AppError::internal(other.to_string()),
        }
    }
}

/// Failure reading or writing the `users` table.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileError {
    /// No row for the requested id.
    NotFound,
    /// Insert hit the primary-key uniqueness constraint.
    Conflict(String),
    /// A row came back for a different id than was asked for.
    IdentityMismatch { expected: String, found: String },
    /// Any other storage or transport failure.
    Database(String),
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileError::NotFound => write!(f, "profile not found"),
            ProfileError::Conflict(msg) => write!(f, "profile already exists: {msg}"),
            ProfileError::IdentityMismatch { expected, found } => {
                write!(f, "profile {found} returned for identity {expected}")
            }
            ProfileError::Database(msg) => write!(f, "profile store error: {msg}"),
        }
    }
}

impl std::error::Error for ProfileError {}

impl From<ProfileError> for AppError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::NotFound => AppError::not_found("Profile not found"),
            ProfileError::Conflict(msg) => AppError::conflict(msg),
            other => AppError::database(other.to_string()),
        }
    }
}

/// Failure of the registration flow.
#[derive(Debug, Clone, PartialEq)]
pub enum SignUpError {
    /// The credential itself could not be created.
    Auth(AuthError),
    /// The credential exists but its profile row could not be written.
    ProfileCreation {
        identity: Identity,
        source: ProfileError,
    },
}

impl fmt::Display for SignUpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignUpError::Auth(err) => write!(f, "sign-up failed: {err}"),
            SignUpError::ProfileCreation { identity, source } => write!(
                f,
                "account {} was created but its profile was not: {source}",
                identity.id
            ),
        }
    }
}

impl std::error::Error for SignUpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SignUpError::Auth(err) => Some(err),
            SignUpError::ProfileCreation { source, .. } => Some(source),
        }
    }
}

impl From<AuthError> for SignUpError {
    fn from(err: AuthError) -> Self {
        SignUpError::Auth(err)
    }
}

impl From<SignUpError> for AppError {
    fn from(err: SignUpError) -> Self {
        match err {
            SignUpError::Auth(AuthError::Provider { message, .. }) => AppError::conflict(message),
            SignUpError::Auth(other) => other.into(),
            SignUpError::ProfileCreation { .. } => AppError::internal(
                "Your account was created, but we could not save your profile. Please contact support.",
            ),
        }
    }
}
