//! Query parameter extractors and helpers

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Pagination query parameters shared by every list endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PaginationQuery {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "must be >= 1"))]
    pub page: u32,

    #[serde(default = "default_per_page")]
    #[validate(range(min = 1, max = 100, message = "must be between 1 and 100"))]
    pub per_page: u32,

    /// Creation-time order of the listing
    #[serde(default)]
    pub order: SortOrder,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
            order: SortOrder::Asc,
        }
    }
}

impl PaginationQuery {
    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }

    /// Zero-based page index, as SeaORM paginators expect it
    pub fn page_index(&self) -> u64 {
        u64::from(self.page.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_query_default() {
        let pagination = PaginationQuery::default();
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.per_page, 20);
        assert_eq!(pagination.order, SortOrder::Asc);
    }

    #[test]
    fn test_pagination_query_paging() {
        let pagination = PaginationQuery {
            page: 3,
            per_page: 10,
            ..Default::default()
        };
        assert_eq!(pagination.limit(), 10);
        assert_eq!(pagination.page_index(), 2);
    }

    #[test]
    fn test_pagination_query_validation() {
        assert!(PaginationQuery::default().validate().is_ok());

        let invalid_page = PaginationQuery {
            page: 0,
            ..Default::default()
        };
        assert!(invalid_page.validate().is_err());

        let invalid_per_page = PaginationQuery {
            per_page: 101,
            ..Default::default()
        };
        assert!(invalid_per_page.validate().is_err());
    }

    #[test]
    fn test_parse_from_query_string() {
        let query: PaginationQuery =
            serde_urlencoded::from_str("page=2&per_page=5&order=desc&status=active").unwrap();
        assert_eq!(query.page, 2);
        assert_eq!(query.per_page, 5);
        assert_eq!(query.order, SortOrder::Desc);

        assert!(serde_urlencoded::from_str::<PaginationQuery>("order=sideways").is_err());
    }
}
