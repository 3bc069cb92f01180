//! Allow-list handlers: list, create, toggle authorization.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch};
use axum::{Json, Router};

use crate::api::dto::{CreatePlateRequest, UpdatePlateRequest};
use crate::app_state::AppState;
use crate::domain::AllowListEntry;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /plates`: List allow-list entries.
///
/// # Errors
///
/// Returns [`GatewayError::PersistenceError`] on database failure.
#[utoipa::path(
    get,
    path = "/api/v1/plates",
    tag = "Plates",
    summary = "List allow-list entries",
    description = "Returns every allow-list entry, newest first.",
    responses(
        (status = 200, description = "Allow-list entries", body = Vec<AllowListEntry>),
    )
)]
pub async fn list_plates(State(state): State<AppState>) -> Result<impl IntoResponse, GatewayError> {
    let entries = state.persistence.list_entries().await?;
    Ok(Json(entries))
}

/// `POST /plates`: Add an identifier to the allow-list.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for a blank identifier and
/// [`GatewayError::DuplicateIdentifier`] if it is already listed.
#[utoipa::path(
    post,
    path = "/api/v1/plates",
    tag = "Plates",
    summary = "Add allow-list entry",
    description = "Adds a plate identifier. Surrounding whitespace is trimmed.",
    request_body = CreatePlateRequest,
    responses(
        (status = 201, description = "Entry created", body = AllowListEntry),
        (status = 400, description = "Blank identifier", body = ErrorResponse),
        (status = 409, description = "Identifier already listed", body = ErrorResponse),
    )
)]
pub async fn create_plate(
    State(state): State<AppState>,
    Json(req): Json<CreatePlateRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let identifier = req.identifier.trim();
    if identifier.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "identifier must not be empty".to_string(),
        ));
    }

    let entry = state
        .persistence
        .create_entry(identifier, req.authorized)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// `PATCH /plates/{id}`: Grant or revoke authorization.
///
/// # Errors
///
/// Returns [`GatewayError::EntryNotFound`] if the entry does not exist.
#[utoipa::path(
    patch,
    path = "/api/v1/plates/{id}",
    tag = "Plates",
    summary = "Update authorization",
    description = "Sets the authorization flag of an allow-list entry.",
    params(
        ("id" = i64, Path, description = "Entry ID"),
    ),
    request_body = UpdatePlateRequest,
    responses(
        (status = 200, description = "Updated entry", body = AllowListEntry),
        (status = 404, description = "Entry not found", body = ErrorResponse),
    )
)]
pub async fn update_plate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdatePlateRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let entry = state
        .persistence
        .set_authorization(id, req.authorized)
        .await?;
    Ok(Json(entry))
}

/// Allow-list routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/plates", get(list_plates).post(create_plate))
        .route("/plates/{id}", patch(update_plate))
}
