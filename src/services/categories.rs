use std::sync::Arc;

use tracing::info;

use super::query::CategoryQuery;
use crate::client::{ApiRequest, DispatchError, Dispatcher};
use crate::models::{Category, CategoryPatch, NewCategory, Page};

const CATEGORIES_PATH: &str = "/categories";

#[derive(Clone)]
pub struct CategoriesService {
    dispatcher: Arc<Dispatcher>,
}

impl CategoriesService {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        CategoriesService { dispatcher }
    }

    pub async fn list(&self, query: &CategoryQuery) -> Result<Page<Category>, DispatchError> {
        let request = ApiRequest::get(CATEGORIES_PATH).with_query(query)?;
        self.dispatcher.fetch(request).await
    }

    pub async fn create(&self, category: &NewCategory) -> Result<Category, DispatchError> {
        let request = ApiRequest::post(CATEGORIES_PATH).with_json(category)?;
        let created: Category = self.dispatcher.fetch(request).await?;
        info!("Created category '{}' ({})", created.name, created.id);
        Ok(created)
    }

    /// Categories are replaced with `PUT`, unlike users.
    pub async fn update(&self, id: &str, patch: &CategoryPatch) -> Result<Category, DispatchError> {
        let request = ApiRequest::put(format!("{}/{}", CATEGORIES_PATH, id)).with_json(patch)?;
        self.dispatcher.fetch(request).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), DispatchError> {
        self.dispatcher
            .execute(ApiRequest::delete(format!("{}/{}", CATEGORIES_PATH, id)))
            .await?;
        info!("Deleted category {}", id);
        Ok(())
    }
}
