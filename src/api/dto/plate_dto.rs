//! Allow-list request DTOs.

use serde::Deserialize;
use utoipa::ToSchema;

/// Request body for `POST /api/v1/plates`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePlateRequest {
    /// Plate identifier as the recognition service reports it.
    pub identifier: String,
    /// Whether a match opens the gate. Defaults to `true`.
    #[serde(default = "default_authorized")]
    pub authorized: bool,
}

/// Request body for `PATCH /api/v1/plates/{id}`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdatePlateRequest {
    /// New authorization flag.
    pub authorized: bool,
}

fn default_authorized() -> bool {
    true
}
