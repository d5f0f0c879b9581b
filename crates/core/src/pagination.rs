//! Page/limit arithmetic for admin listings.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Column a pending-verification listing is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    RequestedAt,
    SubmitterName,
}

impl SortField {
    /// SQL expression for the ORDER BY clause.
    pub fn column(self) -> &'static str {
        match self {
            SortField::RequestedAt => "vr.requested_at",
            SortField::SubmitterName => "u.name",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Validate `page` (1-based) and clamp `limit` into `1..=MAX_PAGE_LIMIT`.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Result<Self, CoreError> {
        let page = page.unwrap_or(1);
        if page < 1 {
            return Err(CoreError::Validation(format!(
                "page must be at least 1, got {page}"
            )));
        }
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
        if (page - 1).checked_mul(limit).is_none() {
            return Err(CoreError::Validation(format!("page {page} is out of range")));
        }
        Ok(Self { page, limit })
    }

    /// Row offset of the first item. `new` guarantees this cannot overflow.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// Pagination metadata returned alongside a page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub total_items: i64,
    pub items_per_page: i64,
    pub current_page: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(request: PageRequest, total_items: i64) -> Self {
        let total_pages = (total_items + request.limit - 1) / request.limit;
        Self {
            total_items,
            items_per_page: request.limit,
            current_page: request.page,
            total_pages,
            has_next: request.page < total_pages,
            has_prev: request.page > 1,
        }
    }
}
