//! Allow-list entries and lookup outcomes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// A stored row from the `allow_list_entries` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AllowListEntry {
    /// Auto-increment row ID.
    pub id: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Plate identifier (unique).
    pub identifier: String,
    /// Whether the entry currently grants access.
    pub authorized: bool,
}

/// Result of looking up one identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    /// An active entry exists.
    Authorized,
    /// An entry exists but is inactive.
    NotAuthorized,
    /// No entry exists. A normal negative match, not an error.
    NotFound,
}

impl LookupOutcome {
    /// Maps an optional entry to its outcome.
    #[must_use]
    pub fn of(entry: Option<&AllowListEntry>) -> Self {
        match entry {
            Some(e) if e.authorized => Self::Authorized,
            Some(_) => Self::NotAuthorized,
            None => Self::NotFound,
        }
    }
}

/// How recognized identifiers are compared against stored entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// Byte-for-byte equality.
    #[default]
    Exact,
    /// Surrounding whitespace trimmed, ASCII case ignored.
    Normalized,
}

impl MatchMode {
    /// Prepares a candidate identifier for lookup under this mode.
    #[must_use]
    pub fn prepare<'a>(&self, identifier: &'a str) -> &'a str {
        match self {
            Self::Exact => identifier,
            Self::Normalized => identifier.trim(),
        }
    }
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "normalized" | "case_insensitive" => Ok(Self::Normalized),
            other => Err(format!("unknown plate match mode: {other}")),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => f.write_str("exact"),
            Self::Normalized => f.write_str("normalized"),
        }
    }
}
