//! Wiring from configuration to [`AppState`].

use std::sync::Arc;

use tracing::{debug, info};

use crate::auth::{AuthSession, HttpAuthEndpoint, RouteGuard};
use crate::client::{ApiError, DispatchPolicy, Dispatcher, HttpTransport, Transport};
use crate::config::ConfigV1;
use crate::navigation::Navigator;
use crate::services::{CategoriesService, ProductsService, UsersService};
use crate::state::AppState;
use crate::store::{create_storage, StoreError, TokenStore};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to open session storage: {0}")]
    Storage(#[from] StoreError),

    #[error("failed to create HTTP client: {0}")]
    Client(#[from] ApiError),
}

/// Builds the storage, transport, dispatcher, session and services.
///
/// `navigator` receives every redirect, including forced logouts raised by
/// the dispatcher.
pub fn build_state(
    config: Arc<ConfigV1>,
    navigator: Arc<dyn Navigator>,
) -> Result<AppState, StartupError> {
    let storage = create_storage(&config.storage)?;
    let store = TokenStore::new(storage);
    info!(
        "Using '{}' session storage, API at {}",
        store.backend_name(),
        config.api.base_url
    );

    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(
        &config.api.base_url,
        config.api.timeout(),
    )?);
    let endpoint = Arc::new(HttpAuthEndpoint::new(transport.clone(), &config.auth));

    let policy = DispatchPolicy::from_config(&config.auth);
    debug!("Dispatch policy: {:?}", policy);
    let dispatcher = Arc::new(Dispatcher::new(
        transport,
        endpoint.clone(),
        store.clone(),
        navigator.clone(),
        policy,
    ));

    let session = Arc::new(AuthSession::new(
        endpoint,
        dispatcher.clone(),
        navigator.clone(),
        &config.auth,
    ));

    Ok(AppState {
        guard: RouteGuard::new(store.clone()),
        users: UsersService::new(dispatcher.clone()),
        products: ProductsService::new(dispatcher.clone()),
        categories: CategoriesService::new(dispatcher.clone()),
        config,
        store,
        dispatcher,
        session,
        navigator,
    })
}
