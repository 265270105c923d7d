use std::sync::Arc;

use tracing::info;

use super::query::UserQuery;
use crate::client::{ApiRequest, DispatchError, Dispatcher};
use crate::models::{NewUser, Page, User, UserPatch};

const USERS_PATH: &str = "/users";

/// Admin accounts under `/users`.
#[derive(Clone)]
pub struct UsersService {
    dispatcher: Arc<Dispatcher>,
}

impl UsersService {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        UsersService { dispatcher }
    }

    pub async fn list(&self, query: &UserQuery) -> Result<Page<User>, DispatchError> {
        let request = ApiRequest::get(USERS_PATH).with_query(query)?.no_cache();
        self.dispatcher.fetch(request).await
    }

    pub async fn create(&self, user: &NewUser) -> Result<User, DispatchError> {
        let request = ApiRequest::post(USERS_PATH).with_json(user)?;
        let created: User = self.dispatcher.fetch(request).await?;
        info!("Created user '{}' ({})", created.email, created.id);
        Ok(created)
    }

    pub async fn update(&self, id: &str, patch: &UserPatch) -> Result<User, DispatchError> {
        let request = ApiRequest::patch(format!("{}/{}", USERS_PATH, id)).with_json(patch)?;
        self.dispatcher.fetch(request).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), DispatchError> {
        self.dispatcher
            .execute(ApiRequest::delete(format!("{}/{}", USERS_PATH, id)))
            .await?;
        info!("Deleted user {}", id);
        Ok(())
    }
}
