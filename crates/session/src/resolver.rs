use crate::provider::ProfileStore;
use shared_types::{Identity, NewProfile, ProfileError, UserProfile};
use std::fmt;
use std::sync::Arc;

/// No usable profile could be produced for an identity.
///
/// The user stays signed in; the gate sends them back to the login page.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileAbsent {
    pub user_id: String,
    pub cause: ProfileError,
}

impl fmt::Display for ProfileAbsent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no profile for {}: {}", self.user_id, self.cause)
    }
}

impl std::error::Error for ProfileAbsent {}

/// Maps an identity to its `UserProfile`, provisioning a default row the
/// first time an identity is seen.
///
/// Each call makes a single attempt. Provisioning relies on the store's
/// uniqueness constraint: a concurrent insert that loses the race re-reads
/// the winner's row, so at most one row exists per identity.
#[derive(Clone)]
pub struct ProfileResolver {
    store: Arc<dyn ProfileStore>,
}

impl ProfileResolver {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ProfileStore> {
        &self.store
    }

    pub async fn resolve(&self, identity: &Identity) -> Result<UserProfile, ProfileAbsent> {
        match self.store.fetch_profile(&identity.id).await {
            Ok(profile) => self.verified(identity, profile),
            Err(ProfileError::NotFound) => self.provision(identity).await,
            Err(cause) => {
                tracing::error!(user_id = %identity.id, %cause, "Failed to fetch user profile");
                Err(absent(identity, cause))
            }
        }
    }

    async fn provision(&self, identity: &Identity) -> Result<UserProfile, ProfileAbsent> {
        let draft = NewProfile::provisioned_for(identity);
        tracing::info!(user_id = %identity.id, "No profile row, provisioning default profile");

        match self.store.insert_profile(&draft).await {
            Ok(profile) => self.verified(identity, profile),
            Err(ProfileError::Conflict(detail)) => {
                tracing::debug!(user_id = %identity.id, %detail, "Profile provisioned concurrently, re-reading");
                match self.store.fetch_profile(&identity.id).await {
                    Ok(profile) => self.verified(identity, profile),
                    Err(cause) => {
                        tracing::error!(user_id = %identity.id, %cause, "Failed to re-read provisioned profile");
                        Err(absent(identity, cause))
                    }
                }
            }
            Err(cause) => {
                tracing::error!(user_id = %identity.id, %cause, "Failed to provision user profile");
                Err(absent(identity, cause))
            }
        }
    }

    fn verified(
        &self,
        identity: &Identity,
        profile: UserProfile,
    ) -> Result<UserProfile, ProfileAbsent> {
        if profile.id == identity.id {
            return Ok(profile);
        }
        let cause = ProfileError::IdentityMismatch {
            expected: identity.id.clone(),
            found: profile.id,
        };
        tracing::error!(user_id = %identity.id, %cause, "Profile store returned a foreign row");
        Err(absent(identity, cause))
    }
}

fn absent(identity: &Identity, cause: ProfileError) -> ProfileAbsent {
    ProfileAbsent {
        user_id: identity.id.clone(),
        cause,
    }
}
