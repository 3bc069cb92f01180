//! In-memory collaborators for exercising the pipeline and hub in tests.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::{AllowListGate, AllowListLookup, DecisionStore, IngestionPipeline};
use crate::domain::{
    AllowListEntry, DecisionDraft, DecisionRecord, DecisionUpdate, IngestionId, MatchMode,
};
use crate::error::GatewayError;
use crate::recognition::{RecognitionError, RecognitionResult, Recognizer};
use crate::storage::{ArtifactHandle, ArtifactRole, ArtifactStore};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[derive(Debug, Default)]
pub(crate) struct MemoryArtifacts {
    files: Mutex<HashMap<String, Vec<u8>>>,
    writes: Mutex<Vec<(IngestionId, ArtifactRole)>>,
    failing: HashSet<ArtifactRole>,
}

impl MemoryArtifacts {
    pub(crate) fn failing_on(role: ArtifactRole) -> Self {
        Self {
            failing: HashSet::from([role]),
            ..Self::default()
        }
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        lock(&self.files).contains_key(key)
    }

    pub(crate) fn get(&self, key: &str) -> Option<Vec<u8>> {
        lock(&self.files).get(key).cloned()
    }

    pub(crate) fn writes(&self) -> Vec<(IngestionId, ArtifactRole)> {
        lock(&self.writes).clone()
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifacts {
    async fn put(
        &self,
        id: IngestionId,
        role: ArtifactRole,
        bytes: &[u8],
    ) -> Result<ArtifactHandle, GatewayError> {
        if self.failing.contains(&role) {
            return Err(GatewayError::ArtifactStorage(format!("{role} disk full")));
        }
        let key = role.file_name(id);
        lock(&self.files).insert(key.clone(), bytes.to_vec());
        lock(&self.writes).push((id, role));
        Ok(ArtifactHandle {
            path: PathBuf::from(&key),
            key,
        })
    }
}

#[derive(Debug)]
pub(crate) struct StaticRecognizer {
    reply: Result<RecognitionResult, RecognitionError>,
    calls: AtomicUsize,
}

impl StaticRecognizer {
    pub(crate) fn plates(plates: &[&str]) -> Self {
        Self {
            reply: Ok(RecognitionResult {
                composite_image: "bW9zYWlj".to_string(),
                identifiers: plates.iter().map(|p| (*p).to_string()).collect(),
            }),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn replying(reply: Result<RecognitionResult, RecognitionError>) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Recognizer for StaticRecognizer {
    async fn recognize(
        &self,
        _artifact: &ArtifactHandle,
    ) -> Result<RecognitionResult, RecognitionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.reply.clone()
    }
}

#[derive(Debug, Default)]
pub(crate) struct MemoryAllowList {
    entries: HashMap<String, bool>,
    failing: HashSet<String>,
    queried: Mutex<Vec<String>>,
}

impl MemoryAllowList {
    pub(crate) fn with(entries: &[(&str, bool)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(id, authorized)| ((*id).to_string(), *authorized))
                .collect(),
            ..Self::default()
        }
    }

    pub(crate) fn failing_for(mut self, identifier: &str) -> Self {
        self.failing.insert(identifier.to_string());
        self
    }

    pub(crate) fn queried(&self) -> Vec<String> {
        lock(&self.queried).clone()
    }
}

#[async_trait]
impl AllowListLookup for MemoryAllowList {
    async fn find_entry(
        &self,
        identifier: &str,
        mode: MatchMode,
    ) -> Result<Option<AllowListEntry>, GatewayError> {
        lock(&self.queried).push(identifier.to_string());
        if self.failing.contains(identifier) {
            return Err(GatewayError::PersistenceError("database is locked".to_string()));
        }
        let found = self.entries.iter().find(|(stored, _)| match mode {
            MatchMode::Exact => stored.as_str() == identifier,
            MatchMode::Normalized => stored.eq_ignore_ascii_case(identifier),
        });
        Ok(found.map(|(stored, authorized)| AllowListEntry {
            id: 1,
            created_at: Utc::now(),
            identifier: stored.clone(),
            authorized: *authorized,
        }))
    }
}

#[derive(Debug, Default)]
pub(crate) struct MemoryDecisions {
    records: Mutex<Vec<DecisionRecord>>,
    fail_inserts: usize,
    fail_updates: bool,
    insert_attempts: AtomicUsize,
}

impl MemoryDecisions {
    /// Fails the first `n` inserts.
    pub(crate) fn failing_inserts(n: usize) -> Self {
        Self {
            fail_inserts: n,
            ..Self::default()
        }
    }

    pub(crate) fn failing_updates() -> Self {
        Self {
            fail_updates: true,
            ..Self::default()
        }
    }

    pub(crate) fn records(&self) -> Vec<DecisionRecord> {
        lock(&self.records).clone()
    }
}

#[async_trait]
impl DecisionStore for MemoryDecisions {
    async fn insert_decision(&self, draft: &DecisionDraft) -> Result<i64, GatewayError> {
        let attempt = self.insert_attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.fail_inserts {
            return Err(GatewayError::PersistenceError("insert failed".to_string()));
        }
        let mut records = lock(&self.records);
        let id = i64::try_from(records.len()).unwrap_or(i64::MAX) + 1;
        records.push(DecisionRecord {
            id,
            created_at: draft.created_at,
            identifiers: draft.identifiers.clone(),
            original_artifact: Some(draft.original_artifact.clone()),
            result_artifact: draft.result_artifact.clone(),
            authorized: draft.authorized,
        });
        Ok(id)
    }

    async fn update_decision(&self, id: i64, update: &DecisionUpdate) -> Result<(), GatewayError> {
        if self.fail_updates {
            return Err(GatewayError::PersistenceError("update failed".to_string()));
        }
        let mut records = lock(&self.records);
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(GatewayError::DecisionNotFound(id))?;
        record.identifiers = update.identifiers.clone();
        record.result_artifact = update.result_artifact.clone();
        record.authorized = update.authorized;
        Ok(())
    }
}

/// Collaborators wired into one pipeline, kept for assertions.
#[derive(Debug)]
pub(crate) struct Fixture {
    pub(crate) artifacts: Arc<MemoryArtifacts>,
    pub(crate) recognizer: Arc<StaticRecognizer>,
    pub(crate) allow_list: Arc<MemoryAllowList>,
    pub(crate) decisions: Arc<MemoryDecisions>,
}

impl Fixture {
    pub(crate) fn new(
        artifacts: MemoryArtifacts,
        recognizer: StaticRecognizer,
        allow_list: MemoryAllowList,
        decisions: MemoryDecisions,
    ) -> Self {
        Self {
            artifacts: Arc::new(artifacts),
            recognizer: Arc::new(recognizer),
            allow_list: Arc::new(allow_list),
            decisions: Arc::new(decisions),
        }
    }

    pub(crate) fn recognizing(plates: &[&str], allowed: &[(&str, bool)]) -> Self {
        Self::new(
            MemoryArtifacts::default(),
            StaticRecognizer::plates(plates),
            MemoryAllowList::with(allowed),
            MemoryDecisions::default(),
        )
    }

    pub(crate) fn pipeline(&self) -> IngestionPipeline {
        let gate = AllowListGate::new(
            Arc::clone(&self.allow_list) as Arc<dyn AllowListLookup>,
            MatchMode::Exact,
        );
        IngestionPipeline::new(
            Arc::clone(&self.artifacts) as Arc<dyn ArtifactStore>,
            Arc::clone(&self.recognizer) as Arc<dyn Recognizer>,
            gate,
            Arc::clone(&self.decisions) as Arc<dyn DecisionStore>,
        )
    }
}
