use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StockStatus {
    #[serde(rename = "IN STOCK")]
    InStock,
    #[serde(rename = "LOW STOCK")]
    LowStock,
    #[serde(rename = "OUT OF STOCK")]
    OutOfStock,
}

/// The category a product belongs to, as embedded in product listings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CategoryRef {
    pub id: String,
    pub name: String,
}

/// A catalogue entry. Prices travel as decimal strings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub brand: String,
    pub category: CategoryRef,
    pub base_price: String,
    #[serde(default)]
    pub discount_price: Option<String>,
    pub stock_units: i64,
    pub status: StockStatus,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub main_image: Option<String>,
    pub created_at: String,
}
