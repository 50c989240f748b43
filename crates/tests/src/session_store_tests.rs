use backend::MemoryBackend;
use pretty_assertions::assert_eq;
use shared_types::{AuthError, ProfileError, Role, SessionState, LOGIN_FAILED_MESSAGE};
use std::time::Duration;

use crate::common::{self, PASSWORD};

#[tokio::test]
async fn test_initialize_without_session_is_signed_out() {
    let (store, _backend, _driver) = common::test_session(MemoryBackend::new()).await;

    assert_eq!(store.state(), SessionState::signed_out());
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn test_initialize_restores_development_session() {
    let (store, _backend, _driver) = common::test_session(MemoryBackend::development()).await;

    let state = store.state();
    assert!(!state.loading);
    assert_eq!(state.identity.map(|i| i.email), Some("test@example.com".to_string()));
    assert_eq!(state.profile.map(|p| p.display_name()), Some("John Doe".to_string()));
    assert!(store.has_role(Role::OlderAdult));
}

#[tokio::test]
async fn test_sign_in_records_identity_before_profile() {
    let backend = MemoryBackend::new();
    let identity = common::seed_user(&backend, "akosua@example.com", Some(Role::Caregiver), false);
    backend.delay_fetch(&identity.id, Duration::from_millis(100));
    let (store, _backend, _driver) = common::test_session(backend).await;

    store.sign_in("akosua@example.com", PASSWORD).await.unwrap();

    let state = store.state();
    assert_eq!(state.identity, Some(identity.clone()));
    assert!(state.loading, "resolution should still be pending");
    assert!(state.profile.is_none());

    let state = common::settled(&store).await;
    assert_eq!(state.profile.map(|p| p.id), Some(identity.id));
    assert!(store.has_any_role(&[Role::Caregiver, Role::Therapist]));
}

#[tokio::test]
async fn test_invalid_credentials_leave_state_unchanged() {
    let backend = MemoryBackend::new();
    common::seed_user(&backend, "yaa@example.com", Some(Role::OlderAdult), true);
    let (store, _backend, _driver) = common::test_session(backend).await;

    let err = store.sign_in("yaa@example.com", "not-it").await.unwrap_err();

    assert_eq!(err, AuthError::InvalidCredentials);
    assert_eq!(err.user_message(), LOGIN_FAILED_MESSAGE);
    assert_eq!(store.state(), SessionState::signed_out());
}

#[tokio::test]
async fn test_sign_out_resets_state() {
    let (store, _backend, _driver) = common::test_session(MemoryBackend::development()).await;
    assert!(store.is_authenticated());

    store.sign_out().await.unwrap();

    assert_eq!(store.state(), SessionState::signed_out());
}

#[tokio::test]
async fn test_sign_out_during_resolution_resets_state() {
    let backend = MemoryBackend::new();
    let identity = common::seed_user(&backend, "kwesi@example.com", Some(Role::Therapist), false);
    backend.delay_fetch(&identity.id, Duration::from_millis(200));
    let (store, _backend, _driver) = common::test_session(backend).await;

    store.sign_in("kwesi@example.com", PASSWORD).await.unwrap();
    store.sign_out().await.unwrap();
    assert_eq!(store.state(), SessionState::signed_out());

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(store.state(), SessionState::signed_out());
}

#[tokio::test]
async fn test_failed_sign_out_keeps_session() {
    let (store, backend, _driver) = common::test_session(MemoryBackend::development()).await;
    let before = store.state();
    backend.fail_sign_out(Some(AuthError::Network("connection reset".into())));

    let err = store.sign_out().await.unwrap_err();

    assert_eq!(err, AuthError::Network("connection reset".into()));
    assert_eq!(store.state(), before);
}

#[tokio::test]
async fn test_sign_out_elsewhere_clears_session() {
    let (store, backend, _driver) = common::test_session(MemoryBackend::development()).await;

    backend.sign_out_elsewhere();

    let state = common::wait_until(&store, |s| s.identity.is_none()).await;
    assert_eq!(state, SessionState::signed_out());
}

#[tokio::test]
async fn test_token_refresh_keeps_resolved_profile() {
    let (store, backend, _driver) = common::test_session(MemoryBackend::development()).await;
    let before = store.state();
    let states = common::record_states(&store);

    backend.refresh_token();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(store.state(), before);
    assert!(states.lock().unwrap().iter().all(|s| !s.loading));
    assert_eq!(backend.insert_attempts(), 0);
}

#[tokio::test]
async fn test_profile_fetch_failure_degrades_to_identity_only() {
    let backend = MemoryBackend::new();
    let identity = common::seed_user(&backend, "abena@example.com", Some(Role::OlderAdult), true);
    backend.fail_fetches(Some(ProfileError::Database("503 Service Unavailable".into())));
    let (store, backend, _driver) = common::test_session(backend).await;

    store.sign_in("abena@example.com", PASSWORD).await.unwrap();
    let state = common::settled(&store).await;

    assert_eq!(state.identity, Some(identity));
    assert_eq!(state.profile, None);
    assert!(!store.is_authenticated());
    assert_eq!(backend.insert_attempts(), 0, "fetch errors must not provision");
}

#[tokio::test]
async fn test_token_refresh_retries_missing_profile() {
    let backend = MemoryBackend::new();
    common::seed_user(&backend, "nii@example.com", Some(Role::Admin), false);
    backend.fail_fetches(Some(ProfileError::Database("timeout".into())));
    let (store, backend, _driver) = common::test_session(backend).await;
    store.sign_in("nii@example.com", PASSWORD).await.unwrap();
    assert_eq!(common::settled(&store).await.profile, None);

    backend.fail_fetches(None);
    backend.refresh_token();

    let state = common::wait_until(&store, |s| s.profile.is_some()).await;
    assert!(!state.loading);
    assert!(store.has_role(Role::Admin));
}

#[tokio::test]
async fn test_loading_always_settles() {
    let backend = MemoryBackend::new();
    common::seed_user(&backend, "esi@example.com", Some(Role::OlderAdult), false);
    common::seed_user(&backend, "kojo@example.com", None, false);
    let (store, backend, _driver) = common::test_session(backend).await;
    let states = common::record_states(&store);

    store.sign_in("esi@example.com", PASSWORD).await.unwrap();
    common::settled(&store).await;

    backend.fail_inserts(Some(ProfileError::Database("rls denied".into())));
    store.sign_in("kojo@example.com", PASSWORD).await.unwrap();
    let state = common::settled(&store).await;
    assert!(state.identity.is_some() && state.profile.is_none());

    backend.fail_inserts(None);
    backend.refresh_token();
    common::wait_until(&store, |s| s.profile.is_some() && !s.loading).await;

    assert!(store.sign_in("kojo@example.com", "wrong").await.is_err());
    assert!(!common::settled(&store).await.loading);

    store.sign_out().await.unwrap();
    assert_eq!(common::settled(&store).await, SessionState::signed_out());

    tokio::time::sleep(Duration::from_millis(20)).await;
    for state in states.lock().unwrap().iter() {
        assert!(state.is_consistent(), "inconsistent state observed: {state:?}");
    }
}

#[tokio::test]
async fn test_teardown_stops_driver() {
    let (store, _backend, driver) = common::test_session(MemoryBackend::development()).await;

    store.teardown();
    driver.await.unwrap();

    assert_eq!(
        store.sign_in("test@example.com", "password123").await,
        Err(AuthError::SessionClosed)
    );
}
