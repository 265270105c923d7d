use serde::{Deserialize, Serialize};

/// Every backend response is wrapped as `{ success, data, message? }`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `data` of every list endpoint.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PaginationMeta,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u32,
    pub total_pages: u32,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl PaginationMeta {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}
