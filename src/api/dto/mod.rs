//! Data Transfer Objects for REST request/response serialization.

pub mod common_dto;
pub mod decision_dto;
pub mod plate_dto;

pub use common_dto::*;
pub use decision_dto::*;
pub use plate_dto::*;
