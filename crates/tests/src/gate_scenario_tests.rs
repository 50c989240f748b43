use backend::MemoryBackend;
use pretty_assertions::assert_eq;
use session::gate::{AccessPolicy, Decision, Denial, Redirect, Render};
use session::nav::{nav_items, quick_actions};
use session::routes::navigate;
use session::{decide, route_profile, AppRoute, Dashboard, RoleRoute};
use shared_types::{Role, SessionState};

use crate::common::{self, PASSWORD};

async fn signed_in_as(role: Option<Role>, subscribed: bool) -> SessionState {
    let backend = MemoryBackend::new();
    common::seed_user(&backend, "member@example.com", role, subscribed);
    let (store, _backend, _driver) = common::test_session(backend).await;
    store.sign_in("member@example.com", PASSWORD).await.unwrap();
    common::settled(&store).await
}

#[tokio::test]
async fn test_unsubscribed_older_adult_is_sent_to_subscribe() {
    let session = signed_in_as(Some(Role::OlderAdult), false).await;

    assert_eq!(
        decide(&session, &AccessPolicy::SUBSCRIBED),
        Decision::Redirect(Redirect {
            reason: Denial::SubscriptionRequired,
            to: "/subscribe"
        })
    );
    assert_eq!(navigate(&session, AppRoute::Journal).redirect_target(), Some("/subscribe"));
    assert!(navigate(&session, AppRoute::Subscribe).is_allowed());
    assert!(navigate(&session, AppRoute::Dashboard).is_allowed());
}

#[tokio::test]
async fn test_auto_provisioned_user_is_allowed_in() {
    let session = signed_in_as(None, false).await;

    let profile = session.profile.clone().unwrap();
    assert_eq!(profile.role, Role::OlderAdult);
    assert!(!profile.is_subscribed);
    assert_eq!(profile.first_name, "member");

    assert_eq!(
        decide(&session, &AccessPolicy::AUTHENTICATED),
        Decision::Allow(Render::Content)
    );
    assert_eq!(
        route_profile(session.profile.as_ref()),
        RoleRoute::Dashboard(Dashboard::OlderAdult)
    );
}

#[tokio::test]
async fn test_caregiver_is_kept_out_of_admin() {
    let session = signed_in_as(Some(Role::Caregiver), false).await;

    let decision = decide(&session, &AccessPolicy::roles(&[Role::Admin]));

    assert!(!decision.is_allowed());
    assert_eq!(
        decision,
        Decision::Redirect(Redirect {
            reason: Denial::Forbidden,
            to: "/dashboard"
        })
    );
    assert_eq!(navigate(&session, AppRoute::Admin), decision);
}

#[tokio::test]
async fn test_admin_reaches_admin_panel() {
    let session = signed_in_as(Some(Role::Admin), false).await;

    assert!(navigate(&session, AppRoute::Admin).is_allowed());
    assert_eq!(
        route_profile(session.profile.as_ref()),
        RoleRoute::Dashboard(Dashboard::Admin)
    );
    assert_eq!(nav_items(Role::Admin)[0].path, "/admin");
}

#[tokio::test]
async fn test_signed_in_user_is_bounced_from_login() {
    let session = signed_in_as(Some(Role::Therapist), false).await;

    assert_eq!(navigate(&session, AppRoute::Login).redirect_target(), Some("/dashboard"));
    assert_eq!(navigate(&session, AppRoute::Register).redirect_target(), Some("/dashboard"));
    assert!(quick_actions(session.profile.as_ref().unwrap()).shop);
}

#[tokio::test]
async fn test_loading_session_renders_placeholder() {
    let backend = MemoryBackend::new();
    let identity = common::seed_user(&backend, "late@example.com", Some(Role::Admin), false);
    backend.delay_fetch(&identity.id, std::time::Duration::from_millis(100));
    let (store, _backend, _driver) = common::test_session(backend).await;

    store.sign_in("late@example.com", PASSWORD).await.unwrap();
    let session = store.state();

    assert_eq!(navigate(&session, AppRoute::Admin), Decision::Allow(Render::Loading));
    assert_eq!(navigate(&session, AppRoute::Login), Decision::Allow(Render::Loading));

    let session = common::settled(&store).await;
    assert_eq!(navigate(&session, AppRoute::Admin), Decision::Allow(Render::Content));
}
