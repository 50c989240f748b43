use backend::MemoryBackend;
use pretty_assertions::assert_eq;
use session::{AuthProvider, ProfileStore};
use shared_types::{AuthError, ProfileError, ProfileFields, Role, SignUpError};
use std::time::Duration;

use crate::common;

fn caregiver_fields() -> ProfileFields {
    ProfileFields {
        first_name: "Efua".into(),
        last_name: "Mensah".into(),
        phone: Some("+233200000000".into()),
        role: Some(Role::Caregiver),
    }
}

#[tokio::test]
async fn test_sign_up_creates_profile_with_supplied_fields() {
    let (store, backend, _driver) = common::test_session(MemoryBackend::new()).await;

    let registration = store
        .sign_up("efua@example.com", "secret-pass", caregiver_fields())
        .await
        .unwrap();
    assert!(!registration.awaiting_confirmation);
    let profile = registration.profile;

    assert_eq!(profile.role, Role::Caregiver);
    assert_eq!(profile.display_name(), "Efua Mensah");
    assert!(!profile.is_subscribed);
    assert_eq!(backend.profile(&profile.id), Some(profile.clone()));

    let state = common::wait_until(&store, |s| s.profile.is_some()).await;
    assert_eq!(state.profile, Some(profile));
    assert_eq!(backend.insert_attempts(), 1, "resolver must find the registered row");
}

#[tokio::test]
async fn test_sign_up_defaults_role_to_older_adult() {
    let (store, _backend, _driver) = common::test_session(MemoryBackend::new()).await;
    let fields = ProfileFields {
        first_name: "Kofi".into(),
        last_name: "Boateng".into(),
        phone: Some("   ".into()),
        role: None,
    };

    let profile = store
        .sign_up("kofi@example.com", "secret-pass", fields)
        .await
        .unwrap()
        .profile;

    assert_eq!(profile.role, Role::OlderAdult);
    assert_eq!(profile.phone, None);
}

#[tokio::test]
async fn test_sign_up_credential_failure_is_auth_error() {
    let backend = MemoryBackend::new();
    backend.add_account("taken@example.com", "secret-pass");
    let (store, backend, _driver) = common::test_session(backend).await;

    let err = store
        .sign_up("taken@example.com", "secret-pass", caregiver_fields())
        .await
        .unwrap_err();

    assert!(matches!(err, SignUpError::Auth(AuthError::Provider { status: 422, .. })));
    assert_eq!(backend.insert_attempts(), 0);
}

#[tokio::test]
async fn test_sign_up_profile_failure_is_reported_distinctly() {
    let (store, backend, _driver) = common::test_session(MemoryBackend::new()).await;
    backend.fail_inserts(Some(ProfileError::Database("permission denied".into())));

    let err = store
        .sign_up("adwoa@example.com", "secret-pass", caregiver_fields())
        .await
        .unwrap_err();

    let identity = match err {
        SignUpError::ProfileCreation { identity, source } => {
            assert_eq!(source, ProfileError::Database("permission denied".into()));
            identity
        }
        other => panic!("expected ProfileCreation, got {other:?}"),
    };

    // The credential exists without a row.
    assert_eq!(
        backend.sign_in_with_password("adwoa@example.com", "secret-pass").await,
        Ok(identity.clone())
    );
    assert_eq!(backend.fetch_profile(&identity.id).await, Err(ProfileError::NotFound));

    let state = common::wait_until(&store, |s| s.identity.is_some() && !s.loading).await;
    assert_eq!(state.profile, None);
}

#[tokio::test]
async fn test_sign_up_awaiting_confirmation_stays_signed_out() {
    let backend = MemoryBackend::new();
    backend.require_email_confirmation(true);
    let (store, backend, _driver) = common::test_session(backend).await;

    let registration = store
        .sign_up("abena@example.com", "secret-pass", caregiver_fields())
        .await
        .unwrap();

    assert!(registration.awaiting_confirmation);
    assert_eq!(backend.profile(&registration.profile.id), Some(registration.profile.clone()));
    tokio::time::sleep(Duration::from_millis(50)).await;
    let state = store.state();
    assert_eq!(state.identity, None);
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn test_sign_in_event_during_slow_registration_waits_for_the_row() {
    let (store, backend, _driver) = common::test_session(MemoryBackend::new()).await;
    backend.delay_inserts(Some(Duration::from_millis(100)));

    let profile = store
        .sign_up("esi@example.com", "secret-pass", caregiver_fields())
        .await
        .unwrap()
        .profile;

    let state = common::wait_until(&store, |s| s.profile.is_some()).await;
    assert_eq!(state.profile, Some(profile));
    assert_eq!(backend.insert_attempts(), 1, "no default row may be provisioned over the registration");
}
