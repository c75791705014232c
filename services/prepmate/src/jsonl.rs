//! File-backed session history: one JSON record per line.

use async_trait::async_trait;
use std::path::PathBuf;
use uuid::Uuid;

use prepmate_core::interview::InterviewKind;
use prepmate_core::store::{SessionRecord, SessionStore, StoreError};

pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    // A missing file means an empty history, not an error.
    async fn read_records(&self) -> Result<Vec<SessionRecord>, StoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreError::Io(err.to_string())),
        };

        let mut records = Vec::new();
        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let record: SessionRecord =
                serde_json::from_str(line).map_err(|err| StoreError::Encode(err.to_string()))?;
            records.push(record);
        }
        Ok(records)
    }

    async fn write_records(&self, records: &[SessionRecord]) -> Result<(), StoreError> {
        let mut out = String::new();
        for record in records {
            let line =
                serde_json::to_string(record).map_err(|err| StoreError::Encode(err.to_string()))?;
            out.push_str(&line);
            out.push('\n');
        }
        tokio::fs::write(&self.path, out)
            .await
            .map_err(|err| StoreError::Io(err.to_string()))
    }
}

#[async_trait]
impl SessionStore for JsonlStore {
    async fn append(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let line =
            serde_json::to_string(record).map_err(|err| StoreError::Encode(err.to_string()))?;
        let mut contents = line;
        contents.push('\n');

        use tokio::io::AsyncWriteExt;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|err| StoreError::Io(err.to_string()))?;
        file.write_all(contents.as_bytes())
            .await
            .map_err(|err| StoreError::Io(err.to_string()))?;
        file.flush()
            .await
            .map_err(|err| StoreError::Io(err.to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let records = self.read_records().await?;
        let before = records.len();
        let kept: Vec<SessionRecord> = records.into_iter().filter(|r| r.id != id).collect();
        // Length unchanged means the id was never stored.
        if kept.len() == before {
            return Err(StoreError::NotFound(id));
        }
        self.write_records(&kept).await
    }

    async fn completed_sessions(
        &self,
        identity: &str,
        kind: InterviewKind,
    ) -> Result<u32, StoreError> {
        let records = self.read_records().await?;
        let count = records
            .iter()
            .filter(|r| r.identity == identity && r.kind == kind)
            .count();
        Ok(count as u32)
    }
}
