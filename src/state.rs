//! Shared application state.
//!
//! Everything a front end needs to drive the dashboard: the session hook,
//! the route guard and the resource services, all sharing one dispatcher.

use std::sync::Arc;

use crate::auth::{AuthSession, RouteGuard};
use crate::client::Dispatcher;
use crate::config::ConfigV1;
use crate::navigation::Navigator;
use crate::services::{CategoriesService, ProductsService, UsersService};
use crate::store::TokenStore;

#[derive(Clone)]
pub struct AppState {
    /// Configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    pub store: TokenStore,
    /// The single dispatcher, and with it the single refresh coordinator.
    pub dispatcher: Arc<Dispatcher>,
    pub session: Arc<AuthSession>,
    pub guard: RouteGuard,
    pub navigator: Arc<dyn Navigator>,
    pub users: UsersService,
    pub products: ProductsService,
    pub categories: CategoriesService,
}
