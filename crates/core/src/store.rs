//! Persistent session history.
//!
//! The controller appends one record per completed session and reads back a
//! per-candidate, per-kind count to scale question difficulty. The storage
//! medium is the host's concern; the service ships a JSONL file store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::feedback::FeedbackReport;
use crate::interview::InterviewKind;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store I/O failed: {0}")]
    Io(String),

    #[error("session record could not be encoded: {0}")]
    Encode(String),

    #[error("session record not found: {0}")]
    NotFound(Uuid),
}

/// One completed (or attempted) session as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: Uuid,
    /// Candidate identity: email when available, otherwise the name.
    pub identity: String,
    pub kind: InterviewKind,
    pub role: String,
    pub completed_at: DateTime<Utc>,
    /// Absent when the session ended without any answered questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<FeedbackReport>,
}

impl SessionRecord {
    pub fn new(
        identity: String,
        kind: InterviewKind,
        role: String,
        report: Option<FeedbackReport>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            identity,
            kind,
            role,
            completed_at: Utc::now(),
            report,
        }
    }
}

/// Durable storage for session records.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait SessionStore: Send + Sync {
    /// Appends a record. The record's id must not already exist.
    async fn append(&self, record: &SessionRecord) -> Result<(), StoreError>;

    /// Removes a record by id.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Counts stored sessions for this candidate and interview kind. Drives
    /// the difficulty scaling of generated questions.
    async fn completed_sessions(
        &self,
        identity: &str,
        kind: InterviewKind,
    ) -> Result<u32, StoreError>;
}
