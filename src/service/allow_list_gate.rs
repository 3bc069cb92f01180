//! Allow-list gate: turns recognized identifiers into one verdict.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{AllowListEntry, LookupOutcome, MatchMode, Verdict};
use crate::error::GatewayError;

/// Point lookup against the persistent allow-list.
#[async_trait]
pub trait AllowListLookup: Send + Sync + fmt::Debug {
    /// Finds the entry for `identifier` under `mode`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] if the store fails.
    async fn find_entry(
        &self,
        identifier: &str,
        mode: MatchMode,
    ) -> Result<Option<AllowListEntry>, GatewayError>;
}

/// Stateless authorization decision over an [`AllowListLookup`].
#[derive(Debug, Clone)]
pub struct AllowListGate {
    lookup: Arc<dyn AllowListLookup>,
    mode: MatchMode,
}

impl AllowListGate {
    /// Creates a gate comparing identifiers under `mode`.
    #[must_use]
    pub fn new(lookup: Arc<dyn AllowListLookup>, mode: MatchMode) -> Self {
        Self { lookup, mode }
    }

    /// Looks up one identifier.
    ///
    /// # Errors
    ///
    /// Propagates lookup failures. A missing entry is
    /// [`LookupOutcome::NotFound`], not an error.
    pub async fn check(&self, identifier: &str) -> Result<LookupOutcome, GatewayError> {
        let candidate = self.mode.prepare(identifier);
        let entry = self.lookup.find_entry(candidate, self.mode).await?;
        Ok(LookupOutcome::of(entry.as_ref()))
    }

    /// Scans `identifiers` in order and stops at the first authorized one.
    ///
    /// Blank identifiers are skipped. A failed lookup is logged and counts
    /// as a miss so the scan can continue.
    pub async fn first_authorized(&self, identifiers: &[String]) -> Verdict {
        for identifier in identifiers {
            if identifier.trim().is_empty() {
                continue;
            }
            match self.check(identifier).await {
                Ok(LookupOutcome::Authorized) => {
                    tracing::info!(%identifier, "plate authorized");
                    return Verdict::Authorized {
                        identifier: identifier.clone(),
                    };
                }
                Ok(outcome) => {
                    tracing::debug!(%identifier, ?outcome, "plate not authorized");
                }
                Err(error) => {
                    tracing::warn!(%identifier, %error, "allow-list lookup failed");
                }
            }
        }
        Verdict::Denied
    }
}
