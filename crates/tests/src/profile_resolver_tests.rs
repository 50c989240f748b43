use backend::MemoryBackend;
use pretty_assertions::assert_eq;
use session::{ProfileAbsent, ProfileResolver};
use shared_types::{ProfileError, Role};
use std::sync::Arc;
use std::time::Duration;

use crate::common;

#[tokio::test]
async fn test_concurrent_resolve_persists_one_row() {
    let backend = Arc::new(MemoryBackend::new());
    let identity = backend.add_account("twins@example.com", common::PASSWORD);
    // Both callers read "no row" before either inserts.
    backend.delay_fetch(&identity.id, Duration::from_millis(50));
    let resolver = ProfileResolver::new(backend.clone());

    let (left, right) = tokio::join!(resolver.resolve(&identity), resolver.resolve(&identity));

    let left = left.unwrap();
    let right = right.unwrap();
    assert_eq!(left, right);
    assert_eq!(backend.profile_count(), 1);
    assert_eq!(backend.insert_attempts(), 2, "the losing insert should hit the constraint");
}

#[tokio::test]
async fn test_resolve_returns_existing_row_verbatim() {
    let backend = Arc::new(MemoryBackend::new());
    let identity = common::seed_user(&backend, "mama@example.com", Some(Role::Therapist), true);
    let stored = backend.profile(&identity.id).unwrap();

    let profile = ProfileResolver::new(backend.clone())
        .resolve(&identity)
        .await
        .unwrap();

    assert_eq!(profile, stored);
    assert_eq!(backend.insert_attempts(), 0);
}

#[tokio::test]
async fn test_resolve_provisions_default_profile() {
    let backend = Arc::new(MemoryBackend::new());
    let identity = backend.add_account("grace.owusu@example.com", common::PASSWORD);

    let profile = ProfileResolver::new(backend.clone())
        .resolve(&identity)
        .await
        .unwrap();

    assert_eq!(profile.id, identity.id);
    assert_eq!(profile.email, "grace.owusu@example.com");
    assert_eq!(profile.role, Role::OlderAdult);
    assert_eq!(profile.first_name, "grace.owusu");
    assert_eq!(profile.last_name, "User");
    assert!(!profile.is_subscribed);
    assert_eq!(backend.profile(&identity.id), Some(profile));
}

#[tokio::test]
async fn test_resolve_does_not_fabricate_unpersisted_profile() {
    let backend = Arc::new(MemoryBackend::new());
    let identity = backend.add_account("ghost@example.com", common::PASSWORD);
    backend.fail_inserts(Some(ProfileError::Database("insufficient privilege".into())));

    let result = ProfileResolver::new(backend.clone()).resolve(&identity).await;

    assert_eq!(
        result,
        Err(ProfileAbsent {
            user_id: identity.id,
            cause: ProfileError::Database("insufficient privilege".into()),
        })
    );
    assert_eq!(backend.profile_count(), 0);
}
