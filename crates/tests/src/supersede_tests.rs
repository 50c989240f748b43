use backend::MemoryBackend;
use pretty_assertions::assert_eq;
use shared_types::Role;
use std::time::Duration;

use crate::common::{self, PASSWORD};

#[tokio::test]
async fn test_second_sign_in_supersedes_first() {
    let backend = MemoryBackend::new();
    let first = common::seed_user(&backend, "first@example.com", Some(Role::Admin), false);
    let second = common::seed_user(&backend, "second@example.com", Some(Role::Caregiver), false);
    backend.delay_fetch(&first.id, Duration::from_millis(200));
    let (store, _backend, _driver) = common::test_session(backend).await;
    let states = common::record_states(&store);

    store.sign_in("first@example.com", PASSWORD).await.unwrap();
    store.sign_in("second@example.com", PASSWORD).await.unwrap();

    let state = common::settled(&store).await;
    assert_eq!(state.identity.as_ref(), Some(&second));
    assert_eq!(state.profile.map(|p| p.id), Some(second.id.clone()));

    // Outlast the first resolution.
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(store.has_role(Role::Caregiver));
    for state in states.lock().unwrap().iter() {
        assert!(state.is_consistent(), "inconsistent state observed: {state:?}");
        assert_ne!(
            state.profile.as_ref().map(|p| p.id.as_str()),
            Some(first.id.as_str()),
            "superseded profile reached subscribers"
        );
    }
}

#[tokio::test]
async fn test_external_sign_out_discards_pending_resolution() {
    let backend = MemoryBackend::new();
    let identity = common::seed_user(&backend, "slow@example.com", Some(Role::OlderAdult), true);
    backend.delay_fetch(&identity.id, Duration::from_millis(150));
    let (store, backend, _driver) = common::test_session(backend).await;

    store.sign_in("slow@example.com", PASSWORD).await.unwrap();
    backend.sign_out_elsewhere();

    let state = common::settled(&store).await;
    assert_eq!(state.identity, None);

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(store.state().profile, None);
    assert!(!store.state().loading);
}

#[tokio::test]
async fn test_repeated_sign_in_event_does_not_restart_resolution() {
    let backend = MemoryBackend::new();
    common::seed_user(&backend, "ato@example.com", None, false);
    let (store, backend, _driver) = common::test_session(backend).await;

    store.sign_in("ato@example.com", PASSWORD).await.unwrap();
    backend.refresh_token();
    backend.refresh_token();

    let state = common::wait_until(&store, |s| s.profile.is_some()).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(state.profile.map(|p| p.first_name), Some("ato".to_string()));
    assert_eq!(backend.profile_count(), 1);
    assert_eq!(backend.insert_attempts(), 1);
}

#[tokio::test]
async fn test_slow_sign_in_does_not_hold_up_the_driver() {
    let backend = MemoryBackend::new();
    let first = common::seed_user(&backend, "ama@example.com", Some(Role::OlderAdult), true);
    let second = common::seed_user(&backend, "kojo@example.com", Some(Role::Caregiver), false);
    backend.delay_fetch(&first.id, Duration::from_millis(50));
    backend.delay_sign_in("kojo@example.com", Duration::from_millis(600));
    let (store, _backend, _driver) = common::test_session(backend).await;

    store.sign_in("ama@example.com", PASSWORD).await.unwrap();
    let pending = {
        let store = store.clone();
        tokio::spawn(async move { store.sign_in("kojo@example.com", PASSWORD).await })
    };

    let state = tokio::time::timeout(Duration::from_millis(300), store.settled())
        .await
        .expect("profile resolution waited on a pending sign-in")
        .unwrap();
    assert_eq!(state.profile.map(|p| p.id), Some(first.id.clone()));

    tokio::time::timeout(Duration::from_millis(300), store.sign_out())
        .await
        .expect("sign-out waited on a pending sign-in")
        .unwrap();
    assert_eq!(store.state().identity, None);

    // The slow sign-in still lands once the provider answers.
    pending.await.unwrap().unwrap();
    let state = common::wait_until(&store, |s| s.profile.is_some()).await;
    assert_eq!(state.identity, Some(second));
}
