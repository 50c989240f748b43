//! Route table: every navigable path and the access policy guarding it.

use crate::gate::{decide, AccessPolicy, Decision, Denial, Redirect, Render};
use shared_types::{Role, SessionState};

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const SUBSCRIBE_PATH: &str = "/subscribe";

const ADMIN_ONLY: &[Role] = &[Role::Admin];
const OLDER_ADULT_ONLY: &[Role] = &[Role::OlderAdult];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppRoute {
    Login,
    Register,
    Dashboard,
    Shop,
    Notifications,
    Journal,
    Messages,
    Admin,
    Subscribe,
}

impl AppRoute {
    pub const ALL: [AppRoute; 9] = [
        AppRoute::Login,
        AppRoute::Register,
        AppRoute::Dashboard,
        AppRoute::Shop,
        AppRoute::Notifications,
        AppRoute::Journal,
        AppRoute::Messages,
        AppRoute::Admin,
        AppRoute::Subscribe,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            AppRoute::Login => LOGIN_PATH,
            AppRoute::Register => REGISTER_PATH,
            AppRoute::Dashboard => DASHBOARD_PATH,
            AppRoute::Shop => "/shop",
            AppRoute::Notifications => "/notifications",
            AppRoute::Journal => "/journal",
            AppRoute::Messages => "/messages",
            AppRoute::Admin => "/admin",
            AppRoute::Subscribe => SUBSCRIBE_PATH,
        }
    }

    /// Match a request path. The root and unknown paths land on the dashboard.
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        Self::ALL
            .into_iter()
            .find(|route| route.path() == trimmed)
            .unwrap_or(AppRoute::Dashboard)
    }

    pub fn title(&self) -> &'static str {
        match self {
            AppRoute::Login => "Sign In",
            AppRoute::Register => "Create Account",
            AppRoute::Dashboard => "Dashboard",
            AppRoute::Shop => "Shop",
            AppRoute::Notifications => "Notifications",
            AppRoute::Journal => "Daily Journal",
            AppRoute::Messages => "Messages",
            AppRoute::Admin => "Admin Panel",
            AppRoute::Subscribe => "Subscription",
        }
    }

    /// Routes reachable without signing in.
    pub fn is_public(&self) -> bool {
        matches!(self, AppRoute::Login | AppRoute::Register)
    }

    pub fn policy(&self) -> AccessPolicy<'static> {
        match self {
            AppRoute::Admin => AccessPolicy::roles(ADMIN_ONLY),
            AppRoute::Subscribe => AccessPolicy::roles(OLDER_ADULT_ONLY),
            AppRoute::Journal | AppRoute::Messages => AccessPolicy::SUBSCRIBED,
            AppRoute::Login
            | AppRoute::Register
            | AppRoute::Dashboard
            | AppRoute::Shop
            | AppRoute::Notifications => AccessPolicy::AUTHENTICATED,
        }
    }
}

/// Decide what a navigation to `route` renders.
///
/// Public routes render for anonymous visitors and bounce signed-in users to
/// the dashboard; every other route goes through the gate.
pub fn navigate(session: &SessionState, route: AppRoute) -> Decision {
    if route.is_public() {
        if session.loading {
            return Decision::Allow(Render::Loading);
        }
        if session.is_authenticated() {
            return Decision::Redirect(Redirect {
                reason: Denial::AlreadySignedIn,
                to: DASHBOARD_PATH,
            });
        }
        return Decision::Allow(Render::Content);
    }
    decide(session, &route.policy())
}
