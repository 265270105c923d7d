use std::sync::Arc;

use tracing::info;

use super::query::ProductQuery;
use crate::client::{ApiRequest, DispatchError, Dispatcher};
use crate::models::{Page, Product};

const PRODUCTS_PATH: &str = "/products";

#[derive(Clone)]
pub struct ProductsService {
    dispatcher: Arc<Dispatcher>,
}

impl ProductsService {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        ProductsService { dispatcher }
    }

    pub async fn list(&self, query: &ProductQuery) -> Result<Page<Product>, DispatchError> {
        let request = ApiRequest::get(PRODUCTS_PATH).with_query(query)?.no_cache();
        self.dispatcher.fetch(request).await
    }

    pub async fn get(&self, id: &str) -> Result<Product, DispatchError> {
        self.dispatcher
            .fetch(ApiRequest::get(format!("{}/{}", PRODUCTS_PATH, id)))
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), DispatchError> {
        self.dispatcher
            .execute(ApiRequest::delete(format!("{}/{}", PRODUCTS_PATH, id)))
            .await?;
        info!("Deleted product {}", id);
        Ok(())
    }
}
