//! Page-based pagination utilities.
//!
//! List endpoints accept optional `page` / `per_page` query parameters.
//! Missing or out-of-range values are clamped rather than rejected so that
//! dashboards always get a usable page back.

use serde::{Deserialize, Serialize};

/// First page number.
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when the client does not ask for one.
pub const DEFAULT_PER_PAGE: i64 = 50;

/// Upper bound on the page size.
pub const MAX_PER_PAGE: i64 = 100;

/// A normalized page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    /// Build a page request with the default limits.
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self::with_limits(page, per_page, DEFAULT_PER_PAGE, MAX_PER_PAGE)
    }

    /// Build a page request with caller-supplied limits.
    ///
    /// `page` is raised to at least 1 and `per_page` is clamped to
    /// `1..=max_per_page`.
    pub fn with_limits(
        page: Option<i64>,
        per_page: Option<i64>,
        default_per_page: i64,
        max_per_page: i64,
    ) -> Self {
        let max_per_page = max_per_page.max(1);
        Self {
            page: page.unwrap_or(DEFAULT_PAGE).max(1),
            per_page: per_page
                .unwrap_or(default_per_page)
                .clamp(1, max_per_page),
        }
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// Number of rows to fetch.
    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Pagination metadata returned alongside a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PageInfo {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl PageInfo {
    /// Describe `request` given the total number of matching rows.
    pub fn new(request: PageRequest, total: i64) -> Self {
        Self {
            page: request.page,
            per_page: request.per_page,
            total,
            total_pages: total_pages(total, request.per_page),
        }
    }
}

/// A page of results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PageInfo,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, request: PageRequest, total: i64) -> Self {
        Self {
            data,
            pagination: PageInfo::new(request, total),
        }
    }
}

/// Number of pages needed to show `total` rows, `per_page` at a time.
pub fn total_pages(total: i64, per_page: i64) -> i64 {
    if total <= 0 || per_page <= 0 {
        return 0;
    }
    (total + per_page - 1) / per_page
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::Fake;

    #[test]
    fn test_page_request_defaults() {
        let req = PageRequest::new(None, None);
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, DEFAULT_PER_PAGE);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_page_request_clamps_values() {
        let req = PageRequest::new(Some(0), Some(1000));
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, MAX_PER_PAGE);

        let req = PageRequest::new(Some(-5), Some(0));
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, 1);
    }

    #[test]
    fn test_page_request_offset() {
        let req = PageRequest::new(Some(3), Some(20));
        assert_eq!(req.offset(), 40);
        assert_eq!(req.limit(), 20);
    }

    #[test]
    fn test_page_request_custom_limits() {
        let req = PageRequest::with_limits(None, None, 25, 40);
        assert_eq!(req.per_page, 25);

        let req = PageRequest::with_limits(None, Some(500), 25, 40);
        assert_eq!(req.per_page, 40);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 50), 0);
        assert_eq!(total_pages(1, 50), 1);
        assert_eq!(total_pages(50, 50), 1);
        assert_eq!(total_pages(51, 50), 2);
        assert_eq!(total_pages(10, 0), 0);
    }

    #[test]
    fn test_total_pages_covers_all_rows() {
        for _ in 0..100 {
            let total: i64 = (0..10_000).fake();
            let per_page: i64 = (1..=MAX_PER_PAGE).fake();
            let pages = total_pages(total, per_page);
            assert!(pages * per_page >= total);
            if pages > 0 {
                assert!((pages - 1) * per_page < total);
            }
        }
    }

    #[test]
    fn test_page_info_serialization() {
        let info = PageInfo::new(PageRequest::new(Some(2), Some(10)), 35);
        let json = serde_json::to_value(info).unwrap();
        assert_eq!(json["page"], 2);
        assert_eq!(json["per_page"], 10);
        assert_eq!(json["total"], 35);
        assert_eq!(json["total_pages"], 4);
    }

    #[test]
    fn test_paginated_wraps_data() {
        let page = Paginated::new(vec!["a", "b"], PageRequest::default(), 2);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.pagination.total_pages, 1);
    }
}
