use crate::navigation::{Navigator, Route};
use crate::store::TokenStore;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Route),
}

/// Gates protected routes on the locally stored session.
///
/// The check is synchronous and purely local: a stored access token and a
/// cached profile are enough, expiry is not validated against the server.
#[derive(Clone)]
pub struct RouteGuard {
    store: TokenStore,
}

impl RouteGuard {
    pub fn new(store: TokenStore) -> Self {
        RouteGuard { store }
    }

    pub fn has_session(&self) -> bool {
        self.store.access_token().is_some() && self.store.profile().is_some()
    }

    pub fn check(&self, route: &Route) -> GuardDecision {
        if !route.is_protected() || self.has_session() {
            GuardDecision::Allow
        } else {
            GuardDecision::Redirect(Route::Login)
        }
    }

    /// Runs `check` and performs the redirect, if any. Returns whether the
    /// requested route may be rendered.
    pub fn enforce(&self, route: &Route, navigator: &dyn Navigator) -> bool {
        match self.check(route) {
            GuardDecision::Allow => true,
            GuardDecision::Redirect(target) => {
                tracing::debug!("Guard redirecting '{}' to '{}'", route, target);
                navigator.navigate(target);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::UserProfile;
    use crate::navigation::RouteHistory;
    use crate::store::MemoryStorage;

    fn guard() -> (RouteGuard, TokenStore) {
        let store = TokenStore::new(Arc::new(MemoryStorage::new()));
        (RouteGuard::new(store.clone()), store)
    }

    #[test]
    fn test_protected_route_needs_token_and_profile() {
        let (guard, store) = guard();
        assert_eq!(
            guard.check(&Route::Users),
            GuardDecision::Redirect(Route::Login)
        );

        store.save("a1", "r1", 3600).unwrap();
        assert_eq!(
            guard.check(&Route::Users),
            GuardDecision::Redirect(Route::Login)
        );

        store
            .save_profile(&UserProfile {
                id: "u1".into(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(guard.check(&Route::Users), GuardDecision::Allow);
    }

    #[test]
    fn test_expired_token_still_passes() {
        let (guard, store) = guard();
        store.save("a1", "r1", -60).unwrap();
        store.save_profile(&UserProfile::default()).unwrap();
        assert!(store.is_expired(0));
        assert_eq!(guard.check(&Route::Dashboard), GuardDecision::Allow);
    }

    #[test]
    fn test_public_routes_always_allowed() {
        let (guard, _) = guard();
        assert_eq!(guard.check(&Route::Login), GuardDecision::Allow);
        assert_eq!(
            guard.check(&Route::from_path("/missing")),
            GuardDecision::Allow
        );
    }

    #[test]
    fn test_enforce_navigates_on_redirect() {
        let (guard, _) = guard();
        let history = RouteHistory::new();
        assert!(!guard.enforce(&Route::Settings, &history));
        assert!(guard.enforce(&Route::Login, &history));
        assert_eq!(history.visited(), vec![Route::Login]);
    }
}
