//! Authorization gate evaluated before rendering any protected view.

use crate::routes::{DASHBOARD_PATH, LOGIN_PATH, SUBSCRIBE_PATH};
use shared_types::{AppError, Role, SessionState};

/// What a protected view requires of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessPolicy<'a> {
    /// Roles allowed through. `None` admits any signed-in role.
    pub required_roles: Option<&'a [Role]>,
    /// Hold unsubscribed older adults at the subscribe page.
    pub require_subscription: bool,
}

impl AccessPolicy<'static> {
    /// Any signed-in user with a profile.
    pub const AUTHENTICATED: AccessPolicy<'static> = AccessPolicy {
        required_roles: None,
        require_subscription: false,
    };

    /// Any signed-in user, with the subscription gate applied.
    pub const SUBSCRIBED: AccessPolicy<'static> = AccessPolicy {
        required_roles: None,
        require_subscription: true,
    };
}

impl<'a> AccessPolicy<'a> {
    pub fn roles(roles: &'a [Role]) -> Self {
        Self {
            required_roles: Some(roles),
            require_subscription: false,
        }
    }

    pub fn with_subscription(mut self) -> Self {
        self.require_subscription = true;
        self
    }
}

/// How an allowed view renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Render {
    /// Session still resolving: show a placeholder, not a denial.
    Loading,
    Content,
}

/// Why a navigation was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// No identity, or an identity without a profile.
    Unauthenticated,
    /// Signed in, but the role is not admitted.
    Forbidden,
    /// Older adult without an active subscription.
    SubscriptionRequired,
    /// Signed-in user opened a sign-in/registration page.
    AlreadySignedIn,
}

impl Denial {
    /// Canonical landing page for this denial.
    ///
    /// Role mismatches land on the dashboard, which every signed-in role can open.
    pub fn target(&self) -> &'static str {
        match self {
            Denial::Unauthenticated => LOGIN_PATH,
            Denial::Forbidden | Denial::AlreadySignedIn => DASHBOARD_PATH,
            Denial::SubscriptionRequired => SUBSCRIBE_PATH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redirect {
    pub reason: Denial,
    pub to: &'static str,
}

impl From<Denial> for Redirect {
    fn from(reason: Denial) -> Self {
        Redirect {
            reason,
            to: reason.target(),
        }
    }
}

/// Outcome of a gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow(Render),
    Redirect(Redirect),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow(_))
    }

    pub fn redirect_target(&self) -> Option<&'static str> {
        match self {
            Decision::Allow(_) => None,
            Decision::Redirect(redirect) => Some(redirect.to),
        }
    }

    /// Convert into an `AppError` for callers that enforce rather than redirect.
    pub fn into_result(self) -> Result<Render, AppError> {
        match self {
            Decision::Allow(render) => Ok(render),
            Decision::Redirect(Redirect { reason, .. }) => Err(match reason {
                Denial::Unauthenticated => AppError::unauthenticated("Sign in to continue"),
                Denial::Forbidden => AppError::forbidden("Your role cannot open this page"),
                Denial::SubscriptionRequired => {
                    AppError::subscription_required("An active care plan is required")
                }
                Denial::AlreadySignedIn => AppError::forbidden("Already signed in"),
            }),
        }
    }
}

/// Decide whether the current session may render a view guarded by `policy`.
///
/// Rules apply in order and the first match wins. Pure: reads the resolved
/// session and nothing else.
pub fn decide(session: &SessionState, policy: &AccessPolicy<'_>) -> Decision {
    if session.loading {
        return Decision::Allow(Render::Loading);
    }

    let profile = match (&session.identity, &session.profile) {
        (Some(_), Some(profile)) => profile,
        _ => return Decision::Redirect(Denial::Unauthenticated.into()),
    };

    if let Some(roles) = policy.required_roles {
        if !roles.contains(&profile.role) {
            return Decision::Redirect(Denial::Forbidden.into());
        }
    }

    if policy.require_subscription && profile.needs_subscription() {
        return Decision::Redirect(Denial::SubscriptionRequired.into());
    }

    Decision::Allow(Render::Content)
}
