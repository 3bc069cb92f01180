//! Decision record response DTOs.

use serde::Serialize;
use utoipa::ToSchema;

use super::PaginationMeta;
use crate::domain::DecisionRecord;

/// Response body for `GET /api/v1/decisions`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DecisionListResponse {
    /// Records on this page, oldest first.
    pub data: Vec<DecisionRecord>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
