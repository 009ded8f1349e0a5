/// API route handlers
///
/// Each submodule owns the request/response types and handlers for one
/// resource. Pagination is shared: list endpoints take `skip`/`limit` query
/// parameters and wrap their rows in [`Paginated`].
///
/// # Modules
///
/// - `auth`: token issuance
/// - `health`: liveness and database probe
/// - `companies`: company management (admin tier)
/// - `users`: user management (admin tier)
/// - `tasks`: task management (authenticated tier, ownership-scoped)

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

pub mod auth;
pub mod companies;
pub mod health;
pub mod tasks;
pub mod users;

fn default_limit() -> i64 {
    10
}

/// Pagination query parameters shared by list endpoints
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    /// Number of rows to skip
    #[serde(default)]
    pub skip: i64,

    /// Page size
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
        }
    }
}

impl PageQuery {
    /// Rejects parameter combinations that cannot describe a page
    pub fn validate(&self) -> ApiResult<()> {
        if self.skip < 0 {
            return Err(ApiError::BadRequest("skip must not be negative".to_string()));
        }
        if self.limit < 1 {
            return Err(ApiError::BadRequest("limit must be at least 1".to_string()));
        }

        Ok(())
    }
}

/// Paginated response envelope
///
/// `total` counts all rows matching the query predicates, independent of
/// the page; `page` is derived from `skip`/`limit`; `size` is the number of
/// rows actually returned.
#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Total matching rows
    pub total: i64,

    /// 1-based page number
    pub page: i64,

    /// Rows in this page
    pub size: i64,

    /// The page of items
    pub items: Vec<T>,
}

impl<T> Paginated<T> {
    /// Wraps a page of items
    ///
    /// Callers must have validated the query first; `limit` is assumed
    /// positive.
    pub fn new(total: i64, query: PageQuery, items: Vec<T>) -> Self {
        Self {
            total,
            page: query.skip / query.limit + 1,
            size: items.len() as i64,
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_numbering() {
        let first = Paginated::new(25, PageQuery { skip: 0, limit: 10 }, vec![0u8; 10]);
        assert_eq!(first.page, 1);
        assert_eq!(first.size, 10);

        let third = Paginated::new(25, PageQuery { skip: 20, limit: 10 }, vec![0u8; 5]);
        assert_eq!(third.page, 3);
        assert_eq!(third.size, 5);
        assert_eq!(third.total, 25);
    }

    #[test]
    fn test_mid_page_skip_rounds_down() {
        let page = Paginated::new(25, PageQuery { skip: 15, limit: 10 }, vec![0u8; 10]);
        assert_eq!(page.page, 2);
    }

    #[test]
    fn test_query_validation() {
        assert!(PageQuery { skip: 0, limit: 10 }.validate().is_ok());
        assert!(PageQuery { skip: -1, limit: 10 }.validate().is_err());
        assert!(PageQuery { skip: 0, limit: 0 }.validate().is_err());
        assert!(PageQuery { skip: 0, limit: -5 }.validate().is_err());
    }

    #[test]
    fn test_default_query() {
        let query = PageQuery::default();
        assert_eq!(query.skip, 0);
        assert_eq!(query.limit, 10);
    }
}
