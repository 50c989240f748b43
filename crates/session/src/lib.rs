//! Session, profile and authorization core.
//!
//! The [`store::SessionStore`] owns who is signed in, the
//! [`resolver::ProfileResolver`] turns an identity into a profile, and
//! [`gate::decide`] / [`router::route_profile`] decide what a navigation
//! renders. The hosted backend is reached only through the traits in
//! [`provider`].

pub mod gate;
pub mod nav;
pub mod provider;
pub mod resolver;
pub mod router;
pub mod routes;
pub mod store;

pub use gate::{decide, AccessPolicy, Decision, Denial, Redirect, Render};
pub use provider::{AuthProvider, AuthSubscription, ProfileStore};
pub use resolver::{ProfileAbsent, ProfileResolver};
pub use router::{route_profile, route_role_name, Dashboard, RoleRoute};
pub use routes::AppRoute;
pub use store::{SessionDriver, SessionStore};
