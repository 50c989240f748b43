use shared_types::{Role, UserProfile};

/// Sidebar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub path: &'static str,
    pub label: &'static str,
}

const fn item(path: &'static str, label: &'static str) -> NavItem {
    NavItem { path, label }
}

const OLDER_ADULT_NAV: &[NavItem] = &[
    item("/dashboard", "Dashboard"),
    item("/care-plan", "Care Plan"),
    item("/journal", "Daily Journal"),
    item("/my-caregiver", "My Caregiver"),
];

const CAREGIVER_NAV: &[NavItem] = &[
    item("/dashboard", "Dashboard"),
    item("/my-clients", "My Clients"),
    item("/tasks", "Tasks"),
    item("/reports", "Reports"),
];

const THERAPIST_NAV: &[NavItem] = &[
    item("/dashboard", "Dashboard"),
    item("/my-clients", "My Clients"),
    item("/sessions", "Sessions"),
    item("/notes", "Session Notes"),
    item("/reports", "Reports"),
];

const ADMIN_NAV: &[NavItem] = &[
    item("/admin", "Admin Panel"),
    item("/admin/users", "User Management"),
    item("/admin/products", "Product Management"),
    item("/admin/assignments", "Assignments"),
    item("/admin/reports", "System Reports"),
];

/// Sidebar entries for a role.
pub fn nav_items(role: Role) -> &'static [NavItem] {
    match role {
        Role::OlderAdult => OLDER_ADULT_NAV,
        Role::Caregiver => CAREGIVER_NAV,
        Role::Therapist => THERAPIST_NAV,
        Role::Admin => ADMIN_NAV,
    }
}

/// Buttons shown under the sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickActions {
    /// `tel:` link for the emergency call button, caregivers and therapists only.
    pub emergency_call: Option<String>,
    pub shop: bool,
}

pub fn quick_actions(profile: &UserProfile) -> QuickActions {
    let emergency_call = match profile.role {
        Role::Caregiver | Role::Therapist => profile
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|phone| !phone.is_empty())
            .map(|phone| format!("tel:{}", phone.replace(' ', ""))),
        Role::OlderAdult | Role::Admin => None,
    };
    QuickActions {
        emergency_call,
        shop: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared_types::{Identity, NewProfile};

    fn profile(role: Role, phone: Option<&str>) -> UserProfile {
        let identity = Identity::new("u-5", "adjoa@example.com");
        let mut profile = NewProfile::provisioned_for(&identity).into_profile(Utc::now());
        profile.role = role;
        profile.phone = phone.map(str::to_string);
        profile
    }

    #[test]
    fn admins_start_at_admin_panel() {
        assert_eq!(nav_items(Role::Admin)[0].path, "/admin");
        for role in [Role::OlderAdult, Role::Caregiver, Role::Therapist] {
            assert_eq!(nav_items(role)[0].path, "/dashboard");
        }
    }

    #[test]
    fn emergency_call_for_care_staff_with_phone() {
        let actions = quick_actions(&profile(Role::Caregiver, Some("+233 24 000 0000")));
        assert_eq!(actions.emergency_call.as_deref(), Some("tel:+233240000000"));
        assert!(actions.shop);
    }

    #[test]
    fn no_emergency_call_without_phone_or_for_other_roles() {
        assert_eq!(quick_actions(&profile(Role::Therapist, None)).emergency_call, None);
        assert_eq!(quick_actions(&profile(Role::Therapist, Some(" "))).emergency_call, None);
        assert_eq!(
            quick_actions(&profile(Role::OlderAdult, Some("+233240000000"))).emergency_call,
            None
        );
    }
}
