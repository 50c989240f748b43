use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Application role controlling the dashboard variant and route access.
///
/// - `OlderAdult`: the person receiving care. Subject to the subscription gate.
/// - `Caregiver`: assigned to one or more older adults.
/// - `Therapist`: runs sessions and writes session notes.
/// - `Admin`: manages users, products and assignments.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    OlderAdult,
    Caregiver,
    Therapist,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::OlderAdult, Role::Caregiver, Role::Therapist, Role::Admin];

    /// Parse a stored role value. Unknown values yield `None` rather than a
    /// default so callers cannot silently widen access.
    pub fn parse_role(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "older_adult" => Some(Role::OlderAdult),
            "caregiver" => Some(Role::Caregiver),
            "therapist" => Some(Role::Therapist),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Lowercase value as stored in the `users.role` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::OlderAdult => "older_adult",
            Role::Caregiver => "caregiver",
            Role::Therapist => "therapist",
            Role::Admin => "admin",
        }
    }

    /// Human readable label for headers and the role switcher.
    pub fn label(&self) -> &'static str {
        match self {
            Role::OlderAdult => "Older Adult",
            Role::Caregiver => "Caregiver",
            Role::Therapist => "Therapist",
            Role::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credential record issued by the hosted auth provider.
///
/// The session store only ever holds a read-only copy; the provider owns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
}

impl Identity {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }

    /// Portion of the email before `@`, or the whole address when there is none.
    pub fn email_local_part(&self) -> &str {
        self.email.split('@').next().unwrap_or_default()
    }
}

/// Application-level user record keyed by the identity id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub role: Role,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_subscribed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_caregiver_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_therapist_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// True when this profile is held back by the subscription gate.
    pub fn needs_subscription(&self) -> bool {
        self.role == Role::OlderAdult && !self.is_subscribed
    }
}

/// Profile fields supplied by the registration form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProfileFields {
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Row inserted into the `users` table. `created_at` is assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProfile {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub is_subscribed: bool,
}

/// Last name given to auto-provisioned profiles.
pub const PROVISIONED_LAST_NAME: &str = "User";

impl NewProfile {
    /// Default profile for an identity that has no row yet.
    pub fn provisioned_for(identity: &Identity) -> Self {
        Self {
            id: identity.id.clone(),
            email: identity.email.clone(),
            role: Role::OlderAdult,
            first_name: identity.email_local_part().to_string(),
            last_name: PROVISIONED_LAST_NAME.to_string(),
            phone: None,
            is_subscribed: false,
        }
    }

    /// Profile created by the registration flow.
    pub fn registered(identity: &Identity, fields: ProfileFields) -> Self {
        Self {
            id: identity.id.clone(),
            email: identity.email.clone(),
            role: fields.role.unwrap_or_default(),
            first_name: fields.first_name,
            last_name: fields.last_name,
            phone: fields.phone.filter(|p| !p.trim().is_empty()),
            is_subscribed: false,
        }
    }

    /// Materialize the stored row.
    pub fn into_profile(self, created_at: DateTime<Utc>) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email,
            role: self.role,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            is_subscribed: self.is_subscribed,
            subscription_expires_at: None,
            assigned_caregiver_id: None,
            assigned_therapist_id: None,
            created_at,
        }
    }
}

/// Snapshot of who is signed in, as seen by guards and views.
///
/// `profile` is only ever present together with `identity`, and its id
/// always equals `identity.id`.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub identity: Option<Identity>,
    pub profile: Option<UserProfile>,
    pub loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::starting()
    }
}

impl SessionState {
    /// State before the provider has been asked for an existing session.
    pub fn starting() -> Self {
        Self {
            identity: None,
            profile: None,
            loading: true,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            identity: None,
            profile: None,
            loading: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some() && self.profile.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.profile.as_ref().map(|p| p.role)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role() == Some(role)
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.role().map(|r| roles.contains(&r)).unwrap_or(false)
    }

    /// Holds when the profile, if any, belongs to the current identity.
    pub fn is_consistent(&self) -> bool {
        match (&self.identity, &self.profile) {
            (_, None) => true,
            (Some(identity), Some(profile)) => identity.id == profile.id,
            (None, Some(_)) => false,
        }
    }
}

/// Kind of auth state change reported by the provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEventKind {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

/// Notification delivered on the provider's auth state channel.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthEvent {
    pub kind: AuthEventKind,
    pub identity: Option<Identity>,
}

impl AuthEvent {
    pub fn signed_in(identity: Identity) -> Self {
        Self {
            kind: AuthEventKind::SignedIn,
            identity: Some(identity),
        }
    }

    pub fn token_refreshed(identity: Identity) -> Self {
        Self {
            kind: AuthEventKind::TokenRefreshed,
            identity: Some(identity),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            kind: AuthEventKind::SignedOut,
            identity: None,
        }
    }
}

/// What the provider did with a new credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The account is active and its session has started.
    SignedIn(Identity),
    /// The provider wants the email address confirmed before the first sign-in.
    AwaitingConfirmation(Identity),
}

impl SignUpOutcome {
    pub fn identity(&self) -> &Identity {
        match self {
            SignUpOutcome::SignedIn(identity) | SignUpOutcome::AwaitingConfirmation(identity) => {
                identity
            }
        }
    }

    pub fn into_identity(self) -> Identity {
        match self {
            SignUpOutcome::SignedIn(identity) | SignUpOutcome::AwaitingConfirmation(identity) => {
                identity
            }
        }
    }
}

/// Result of a completed registration.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub profile: UserProfile,
    /// No session was started; the user signs in after confirming their email.
    pub awaiting_confirmation: bool,
}

fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
