//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Pagination query parameters for list endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl PaginationParams {
    /// Clamps `per_page` to the allowed maximum of 100.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, 100),
        }
    }

    /// Row offset of the first item on this page, after clamping.
    #[must_use]
    pub fn offset(&self) -> u32 {
        let params = self.clamped();
        params.page.saturating_sub(1).saturating_mul(params.per_page)
    }

    /// Builds the metadata block for a result set of `total` items,
    /// after clamping.
    #[must_use]
    pub fn meta(&self, total: u32) -> PaginationMeta {
        let params = self.clamped();
        PaginationMeta {
            page: params.page,
            per_page: params.per_page,
            total,
            total_pages: total.div_ceil(params.per_page),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamped_bounds_page_and_size() {
        let params = PaginationParams {
            page: 0,
            per_page: 500,
        }
        .clamped();
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 100);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn meta_rounds_pages_up() {
        let params = PaginationParams {
            page: 3,
            per_page: 20,
        };
        assert_eq!(params.offset(), 40);
        let meta = params.meta(41);
        assert_eq!(meta.total_pages, 3);
        assert_eq!(params.meta(0).total_pages, 0);
    }

    #[test]
    fn unclamped_zero_page_size_does_not_divide_by_zero() {
        let params = PaginationParams {
            page: 0,
            per_page: 0,
        };
        assert_eq!(params.offset(), 0);
        let meta = params.meta(5);
        assert_eq!(meta.per_page, 1);
        assert_eq!(meta.page, 1);
        assert_eq!(meta.total_pages, 5);
    }
}
