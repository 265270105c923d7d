use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{StockStatus, UserRole, UserStatus};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    pub fn new(page: u32, limit: u32) -> Self {
        Pagination {
            page: page.max(1),
            limit: limit.max(1),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortOrder::Asc),
            "DESC" => Ok(SortOrder::Desc),
            other => Err(format!("invalid sort order '{}', expected ASC or DESC", other)),
        }
    }
}

/// Column sort of a listing. Toggling the current column flips its order,
/// toggling another column starts it ascending.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SortState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

impl SortState {
    pub fn by(field: impl Into<String>, order: SortOrder) -> Self {
        SortState {
            sort_by: Some(field.into()),
            sort_order: Some(order),
        }
    }

    pub fn toggle(&mut self, field: &str) {
        let order = match (&self.sort_by, self.sort_order) {
            (Some(current), Some(order)) if current == field => order.flipped(),
            _ => SortOrder::Asc,
        };
        self.sort_by = Some(field.to_string());
        self.sort_order = Some(order);
    }

    pub fn clear(&mut self) {
        self.sort_by = None;
        self.sort_order = None;
    }
}

/// Query parameters shared by every listing.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct ListQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(flatten)]
    pub sort: SortState,
}

impl ListQuery {
    pub fn page(page: u32, limit: u32) -> Self {
        ListQuery {
            pagination: Pagination::new(page, limit),
            ..Default::default()
        }
    }

    /// Blank searches are dropped rather than sent as `search=`.
    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }

    pub fn with_sort(mut self, sort: SortState) -> Self {
        self.sort = sort;
        self
    }
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct UserQuery {
    #[serde(flatten)]
    pub list: ListQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    #[serde(flatten)]
    pub list: ListQuery,
    /// Category ids, sent comma separated.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StockStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
}

pub type CategoryQuery = ListQuery;
