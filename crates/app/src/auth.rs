use dioxus::prelude::*;
use session::SessionStore;
use shared_types::{Role, SessionState, UserProfile};

/// Session store handle plus its state mirrored into a signal, so components
/// re-render on every change.
#[derive(Clone)]
pub struct SessionContext {
    pub store: SessionStore,
    pub state: Signal<SessionState>,
}

impl SessionContext {
    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_authenticated()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.state.read().has_role(role)
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.state.read().has_any_role(roles)
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.state.read().profile.clone()
    }
}

/// Hook to access the session.
pub fn use_session() -> SessionContext {
    use_context::<SessionContext>()
}

/// Hook to read the signed-in user's profile, if resolved.
pub fn use_profile() -> Option<UserProfile> {
    use_session().profile()
}
