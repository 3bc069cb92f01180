//! OpenAPI document for the admin REST surface.

use utoipa::OpenApi;

use super::dto::{
    CreatePlateRequest, DecisionListResponse, PaginationMeta, UpdatePlateRequest,
};
use super::handlers::{decisions, plates, system};
use crate::domain::{AllowListEntry, DecisionRecord};
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI specification, served at `/api-docs/openapi.json`.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "plate-gateway",
        description = "Admin API for the plate recognition relay: allow-list management and decision history."
    ),
    paths(
        system::health_handler,
        plates::list_plates,
        plates::create_plate,
        plates::update_plate,
        decisions::list_decisions,
        decisions::get_decision,
    ),
    components(schemas(
        system::HealthResponse,
        AllowListEntry,
        CreatePlateRequest,
        UpdatePlateRequest,
        DecisionRecord,
        DecisionListResponse,
        PaginationMeta,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "System", description = "Service status"),
        (name = "Plates", description = "Allow-list management"),
        (name = "Decisions", description = "Ingestion decision history"),
    )
)]
pub struct ApiDoc;
