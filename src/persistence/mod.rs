//! Persistence layer: SQLite allow-list and decision log.
//!
//! [`SqlitePersistence`] implements the [`crate::service::AllowListLookup`]
//! and [`crate::service::DecisionStore`] traits consumed by the pipeline,
//! plus the queries behind the administrative REST surface. The schema
//! lives in `migrations/` and is applied on connect.

pub mod sqlite;

pub use sqlite::SqlitePersistence;
