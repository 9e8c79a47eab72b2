//! Submission persistence boundary.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use pulse_core::{PulseError, PulseResult, Submission, UserId, Volunteer};

/// Persistence backend for volunteers and submissions.
///
/// Implementations own the wire protocol to the actual store; the engine
/// only sees these two operations.
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Register or refresh a volunteer. Idempotent by id.
    async fn upsert_user(&self, id: UserId, full_name: &str) -> PulseResult<()>;

    /// Persist one finalized submission. Failures carry a detail string
    /// suitable for user display.
    async fn insert_submission(&self, submission: &Submission) -> PulseResult<()>;
}

/// In-memory repository used by the demo binary and tests.
#[derive(Default)]
pub struct MemoryRepository {
    users: Mutex<HashMap<UserId, Volunteer>>,
    submissions: Mutex<Vec<Submission>>,
    fail_with: Mutex<Option<String>>,
}

impl MemoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent insert fail with the given detail string.
    pub async fn fail_inserts_with(&self, detail: impl Into<String>) {
        *self.fail_with.lock().await = Some(detail.into());
    }

    /// Snapshot of the registered volunteers.
    pub async fn users(&self) -> Vec<Volunteer> {
        self.users.lock().await.values().cloned().collect()
    }

    /// Snapshot of the stored submissions.
    pub async fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().await.clone()
    }
}

#[async_trait]
impl SubmissionRepository for MemoryRepository {
    async fn upsert_user(&self, id: UserId, full_name: &str) -> PulseResult<()> {
        let mut users = self.users.lock().await;
        users
            .entry(id)
            .and_modify(|v| v.full_name = full_name.to_string())
            .or_insert_with(|| Volunteer::new(id, full_name));
        Ok(())
    }

    async fn insert_submission(&self, submission: &Submission) -> PulseResult<()> {
        if let Some(detail) = self.fail_with.lock().await.clone() {
            return Err(PulseError::Persistence(detail));
        }
        self.submissions.lock().await.push(submission.clone());
        Ok(())
    }
}
