//! Decision history handlers.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{DecisionListResponse, PaginationParams};
use crate::app_state::AppState;
use crate::domain::DecisionRecord;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /decisions`: Page through decision records.
///
/// # Errors
///
/// Returns [`GatewayError::PersistenceError`] on database failure.
#[utoipa::path(
    get,
    path = "/api/v1/decisions",
    tag = "Decisions",
    summary = "List decision records",
    description = "Returns a page of ingestion decision records, oldest first.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated decision list", body = DecisionListResponse),
    )
)]
pub async fn list_decisions(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let params = params.clamped();
    let total = state.persistence.count_decisions().await?;
    let data = state
        .persistence
        .list_decisions(params.offset(), params.per_page)
        .await?;

    Ok(Json(DecisionListResponse {
        data,
        pagination: params.meta(total),
    }))
}

/// `GET /decisions/{id}`: Fetch one decision record.
///
/// # Errors
///
/// Returns [`GatewayError::DecisionNotFound`] if the record does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/decisions/{id}",
    tag = "Decisions",
    summary = "Get decision record",
    params(
        ("id" = i64, Path, description = "Decision record ID"),
    ),
    responses(
        (status = 200, description = "Decision record", body = DecisionRecord),
        (status = 404, description = "Record not found", body = ErrorResponse),
    )
)]
pub async fn get_decision(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, GatewayError> {
    let record = state.persistence.get_decision(id).await?;
    Ok(Json(record))
}

/// Decision history routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/decisions", get(list_decisions))
        .route("/decisions/{id}", get(get_decision))
}
