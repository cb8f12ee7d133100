//! In-memory run registry.
//!
//! Each accepted request becomes a [`RunRecord`] whose state advances as
//! the pipeline progresses. Records live only in process memory: a crash
//! mid-run loses the record along with the run itself.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Received,
    Validated,
    FilesBuilt,
    PublishedLocal,
    SyncedRemote,
    Notified,
    Done,
    Failed,
}

/// Queryable status of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: Uuid,
    pub task: String,
    pub round: i64,
    pub state: RunState,
    /// Error text when the run failed.
    pub detail: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Shared map of run id to record.
#[derive(Default)]
pub struct RunRegistry {
    runs: DashMap<Uuid, RunRecord>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record in the `received` state and return its id.
    pub fn register(&self, task: &str, round: i64) -> Uuid {
        let id = Uuid::new_v4();
        self.runs.insert(
            id,
            RunRecord {
                id,
                task: task.to_string(),
                round,
                state: RunState::Received,
                detail: None,
                updated_at: Utc::now(),
            },
        );
        id
    }

    /// Move a run to `state`. Unknown ids are ignored.
    pub fn advance(&self, id: Uuid, state: RunState) {
        if let Some(mut record) = self.runs.get_mut(&id) {
            record.state = state;
            record.updated_at = Utc::now();
        }
    }

    /// Mark a run failed with the error text.
    pub fn fail(&self, id: Uuid, detail: String) {
        if let Some(mut record) = self.runs.get_mut(&id) {
            record.state = RunState::Failed;
            record.detail = Some(detail);
            record.updated_at = Utc::now();
        }
    }

    pub fn get(&self, id: Uuid) -> Option<RunRecord> {
        self.runs.get(&id).map(|r| r.value().clone())
    }

    /// Snapshot of every known run.
    pub fn list(&self) -> Vec<RunRecord> {
        self.runs.iter().map(|r| r.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}
