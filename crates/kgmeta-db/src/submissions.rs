//! Submission sinks: an append-only JSON-lines log and an in-memory log.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use kgmeta_core::{Error, Result, SubmissionPayload, SubmissionSink};

/// Appends each submission as one JSON line.
pub struct JsonlSubmissionLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlSubmissionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Read every logged submission, oldest first.
    pub async fn read_all(&self) -> Result<Vec<SubmissionPayload>> {
        if !fs::try_exists(&self.path).await? {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).await?;
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str(line).map_err(|e| {
                    Error::Storage(format!("{} line {}: {}", self.path.display(), n + 1, e))
                })
            })
            .collect()
    }
}

#[async_trait]
impl SubmissionSink for JsonlSubmissionLog {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<()> {
        let mut line = serde_json::to_string(payload)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                warn!(path = %self.path.display(), error = %e, "submissions: open failed");
                e
            })?;
        file.write_all(line.as_bytes()).await?;
        file.sync_all().await?;

        info!(
            submission_id = %payload.metadata.submission_id,
            submission_mode = payload.metadata.submission_mode.as_str(),
            path = %self.path.display(),
            "Submission logged"
        );
        Ok(())
    }
}

/// Keeps submissions in memory.
#[derive(Default)]
pub struct InMemorySubmissionLog {
    submissions: RwLock<Vec<SubmissionPayload>>,
}

impl InMemorySubmissionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn submissions(&self) -> Vec<SubmissionPayload> {
        self.submissions.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.submissions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.submissions.read().await.is_empty()
    }
}

#[async_trait]
impl SubmissionSink for InMemorySubmissionLog {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<()> {
        self.submissions.write().await.push(payload.clone());
        Ok(())
    }
}
