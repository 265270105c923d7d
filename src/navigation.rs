//! Dashboard routes and the navigation seam.
//!
//! The library never renders anything. Where a browser client would change
//! location, the library calls a [`Navigator`], and the front end (here the
//! CLI) decides what a redirect means.

use std::fmt;
use std::sync::Mutex;

/// Every route of the admin dashboard.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Users,
    Categories,
    Products,
    Documents,
    ContentPages,
    Settings,
    NotFound(String),
}

impl Route {
    /// Resolves a location path to a route. Unknown paths become `NotFound`.
    pub fn from_path(path: &str) -> Route {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Route::Dashboard,
            "/login" => Route::Login,
            "/users" => Route::Users,
            "/categories" => Route::Categories,
            "/products" => Route::Products,
            "/documents" => Route::Documents,
            "/content-pages" => Route::ContentPages,
            "/settings" => Route::Settings,
            _ => Route::NotFound(path.to_string()),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/",
            Route::Users => "/users",
            Route::Categories => "/categories",
            Route::Products => "/products",
            Route::Documents => "/documents",
            Route::ContentPages => "/content-pages",
            Route::Settings => "/settings",
            Route::NotFound(path) => path,
        }
    }

    /// Pages inside the admin layout require a session.
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login | Route::NotFound(_))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Performs a client-side redirect.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Remembers every redirect in order.
#[derive(Default)]
pub struct RouteHistory {
    visited: Mutex<Vec<Route>>,
}

impl RouteHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> Vec<Route> {
        self.visited.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn last(&self) -> Option<Route> {
        self.visited
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }

    /// Returns and forgets the redirects seen so far.
    pub fn take(&self) -> Vec<Route> {
        std::mem::take(&mut *self.visited.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

impl Navigator for RouteHistory {
    fn navigate(&self, route: Route) {
        self.visited
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(route);
    }
}
