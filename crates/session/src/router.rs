use crate::routes::LOGIN_PATH;
use shared_types::{Role, UserProfile};

/// Dashboard variant rendered at `/dashboard`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dashboard {
    OlderAdult,
    Caregiver,
    Therapist,
    Admin,
}

impl Dashboard {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::OlderAdult => Dashboard::OlderAdult,
            Role::Caregiver => Dashboard::Caregiver,
            Role::Therapist => Dashboard::Therapist,
            Role::Admin => Dashboard::Admin,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Dashboard::OlderAdult => "My Care",
            Dashboard::Caregiver => "Caregiver Dashboard",
            Dashboard::Therapist => "Therapist Dashboard",
            Dashboard::Admin => "Admin Dashboard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleRoute {
    Dashboard(Dashboard),
    Redirect(&'static str),
}

/// Pick the dashboard for an allowed session's profile.
pub fn route_profile(profile: Option<&UserProfile>) -> RoleRoute {
    match profile {
        Some(profile) => RoleRoute::Dashboard(Dashboard::for_role(profile.role)),
        None => RoleRoute::Redirect(LOGIN_PATH),
    }
}

/// Pick the dashboard for a raw stored role value. Unrecognized values go to
/// the login page.
pub fn route_role_name(raw: &str) -> RoleRoute {
    match Role::parse_role(raw) {
        Some(role) => RoleRoute::Dashboard(Dashboard::for_role(role)),
        None => {
            tracing::warn!(role = raw, "Unrecognized role value, redirecting to login");
            RoleRoute::Redirect(LOGIN_PATH)
        }
    }
}
