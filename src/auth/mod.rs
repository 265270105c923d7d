pub mod endpoint;
pub mod guard;
pub mod session;

// Re-export so callers can do "use crate::auth::{AuthSession, RouteGuard};"
pub use endpoint::{AuthEndpoint, HttpAuthEndpoint};
pub use guard::{GuardDecision, RouteGuard};
pub use session::{AuthSession, LoginError, LOGIN_FAILED};
