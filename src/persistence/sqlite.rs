//! SQLite implementation of the persistence layer.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::domain::{AllowListEntry, DecisionDraft, DecisionRecord, DecisionUpdate, MatchMode};
use crate::error::GatewayError;
use crate::service::{AllowListLookup, DecisionStore};

type EntryRow = (i64, DateTime<Utc>, String, bool);
type DecisionRow = (i64, DateTime<Utc>, String, Option<String>, Option<String>, bool);

const ENTRY_COLUMNS: &str = "id, created_at, identifier, authorized";
const DECISION_COLUMNS: &str =
    "id, created_at, identifiers, original_artifact, result_artifact, authorized";

/// SQLite-backed persistence using `sqlx::SqlitePool`.
///
/// Every operation is a single statement; the store provides per-row
/// atomicity and nothing more.
#[derive(Debug, Clone)]
pub struct SqlitePersistence {
    pool: SqlitePool,
}

impl SqlitePersistence {
    /// Creates a persistence layer over an existing pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the database at `url` and applies
    /// migrations.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] if the URL is invalid,
    /// the database cannot be opened, or a migration fails.
    pub async fn connect(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let options: SqliteConnectOptions = url.parse()?;
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(acquire_timeout)
            .connect_with(options.create_if_missing(true))
            .await?;
        let persistence = Self::new(pool);
        persistence.migrate().await?;
        tracing::info!(url, "database ready");
        Ok(persistence)
    }

    /// Applies pending migrations from `migrations/`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), GatewayError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))
    }

    /// Lists all allow-list entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn list_entries(&self) -> Result<Vec<AllowListEntry>, GatewayError> {
        let rows = sqlx::query_as::<_, EntryRow>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM allow_list_entries ORDER BY id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(entry_from_row).collect())
    }

    /// Adds an identifier to the allow-list.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::DuplicateIdentifier`] if the identifier is
    /// already listed, or [`GatewayError::PersistenceError`] otherwise.
    pub async fn create_entry(
        &self,
        identifier: &str,
        authorized: bool,
    ) -> Result<AllowListEntry, GatewayError> {
        let row = sqlx::query_as::<_, EntryRow>(&format!(
            "INSERT INTO allow_list_entries (created_at, identifier, authorized) \
             VALUES (?, ?, ?) RETURNING {ENTRY_COLUMNS}"
        ))
        .bind(Utc::now())
        .bind(identifier)
        .bind(authorized)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let duplicate = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());
            if duplicate {
                GatewayError::DuplicateIdentifier(identifier.to_string())
            } else {
                GatewayError::from(e)
            }
        })?;

        tracing::info!(identifier, authorized, "allow-list entry created");
        Ok(entry_from_row(row))
    }

    /// Sets the authorization flag of an entry.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::EntryNotFound`] if no entry has this ID.
    pub async fn set_authorization(
        &self,
        id: i64,
        authorized: bool,
    ) -> Result<AllowListEntry, GatewayError> {
        let row = sqlx::query_as::<_, EntryRow>(&format!(
            "UPDATE allow_list_entries SET authorized = ? WHERE id = ? RETURNING {ENTRY_COLUMNS}"
        ))
        .bind(authorized)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(GatewayError::EntryNotFound(id))?;

        tracing::info!(id, authorized, "allow-list entry updated");
        Ok(entry_from_row(row))
    }

    /// Loads one page of decision records, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn list_decisions(
        &self,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<DecisionRecord>, GatewayError> {
        let rows = sqlx::query_as::<_, DecisionRow>(&format!(
            "SELECT {DECISION_COLUMNS} FROM decision_records ORDER BY id ASC LIMIT ? OFFSET ?"
        ))
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(decision_from_row).collect())
    }

    /// Counts all decision records.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn count_decisions(&self) -> Result<u32, GatewayError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM decision_records")
            .fetch_one(&self.pool)
            .await?;
        Ok(u32::try_from(total).unwrap_or(u32::MAX))
    }

    /// Loads one decision record.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::DecisionNotFound`] if no record has this ID.
    pub async fn get_decision(&self, id: i64) -> Result<DecisionRecord, GatewayError> {
        let row = sqlx::query_as::<_, DecisionRow>(&format!(
            "SELECT {DECISION_COLUMNS} FROM decision_records WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(GatewayError::DecisionNotFound(id))?;
        Ok(decision_from_row(row))
    }
}

#[async_trait]
impl AllowListLookup for SqlitePersistence {
    async fn find_entry(
        &self,
        identifier: &str,
        mode: MatchMode,
    ) -> Result<Option<AllowListEntry>, GatewayError> {
        let collation = match mode {
            MatchMode::Exact => "",
            MatchMode::Normalized => " COLLATE NOCASE",
        };
        let row = sqlx::query_as::<_, EntryRow>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM allow_list_entries \
             WHERE identifier = ?{collation} ORDER BY authorized DESC, id ASC LIMIT 1"
        ))
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(entry_from_row))
    }
}

#[async_trait]
impl DecisionStore for SqlitePersistence {
    async fn insert_decision(&self, draft: &DecisionDraft) -> Result<i64, GatewayError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO decision_records \
             (created_at, identifiers, original_artifact, result_artifact, authorized) \
             VALUES (?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(draft.created_at)
        .bind(&draft.identifiers)
        .bind(&draft.original_artifact)
        .bind(&draft.result_artifact)
        .bind(draft.authorized)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update_decision(&self, id: i64, update: &DecisionUpdate) -> Result<(), GatewayError> {
        let result = sqlx::query(
            "UPDATE decision_records \
             SET identifiers = ?, result_artifact = ?, authorized = ? WHERE id = ?",
        )
        .bind(&update.identifiers)
        .bind(&update.result_artifact)
        .bind(update.authorized)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(GatewayError::DecisionNotFound(id));
        }
        Ok(())
    }
}

fn entry_from_row((id, created_at, identifier, authorized): EntryRow) -> AllowListEntry {
    AllowListEntry {
        id,
        created_at,
        identifier,
        authorized,
    }
}

fn decision_from_row(
    (id, created_at, identifiers, original_artifact, result_artifact, authorized): DecisionRow,
) -> DecisionRecord {
    DecisionRecord {
        id,
        created_at,
        identifiers,
        original_artifact,
        result_artifact,
        authorized,
    }
}
