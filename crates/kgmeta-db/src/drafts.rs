//! Draft stores with whole-list read/replace semantics.
//!
//! [`JsonFileDraftStore`] keeps the list as one JSON array and replaces the
//! file atomically (temp file + rename). [`InMemoryDraftStore`] backs tests.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use kgmeta_core::{Draft, DraftRepository, Error, Result};

/// Draft list persisted as a JSON array in a single file.
pub struct JsonFileDraftStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileDraftStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl DraftRepository for JsonFileDraftStore {
    async fn read_all(&self) -> Result<Vec<Draft>> {
        if !fs::try_exists(&self.path).await? {
            debug!(path = %self.path.display(), "Draft file missing, starting empty");
            return Ok(Vec::new());
        }
        let bytes = fs::read(&self.path).await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "Draft file is not a valid draft list");
            Error::Storage(format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }

    async fn replace_all(&self, drafts: Vec<Draft>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let data = serde_json::to_vec_pretty(&drafts)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            warn!(temp_path = %temp_path.display(), error = %e, "drafts: File::create failed");
            e
        })?;
        file.write_all(&data).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            warn!(from = %temp_path.display(), to = %self.path.display(), error = %e, "drafts: rename failed");
            e
        })?;

        debug!(path = %self.path.display(), draft_count = drafts.len(), "Draft list written");
        Ok(())
    }
}

/// Draft list held in memory.
#[derive(Default)]
pub struct InMemoryDraftStore {
    drafts: RwLock<Vec<Draft>>,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_drafts(drafts: Vec<Draft>) -> Self {
        Self {
            drafts: RwLock::new(drafts),
        }
    }
}

#[async_trait]
impl DraftRepository for InMemoryDraftStore {
    async fn read_all(&self) -> Result<Vec<Draft>> {
        Ok(self.drafts.read().await.clone())
    }

    async fn replace_all(&self, drafts: Vec<Draft>) -> Result<()> {
        *self.drafts.write().await = drafts;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use kgmeta_core::{FormRecord, FormType};
    use uuid::Uuid;

    fn draft(offset_secs: i64, title: &str) -> Draft {
        let id = Uuid::now_v7();
        Draft {
            id,
            name: Draft::display_name(&FormRecord {
                title: title.to_string(),
                ..Default::default()
            }),
            date: Utc.timestamp_opt(1_700_000_000 + offset_secs, 0).unwrap(),
            form_type: FormType::Normal,
            record: FormRecord {
                title: title.to_string(),
                ..Default::default()
            },
            draft_id: id,
            custom_license_input: None,
            ai_suggestions: Default::default(),
            edit_sessions: Vec::new(),
            total_time_spent_seconds: 0,
            turtle_content: None,
        }
    }

    #[tokio::test]
    async fn test_in_memory_save_replaces_by_draft_id() {
        let store = InMemoryDraftStore::new();
        let mut d = draft(0, "First");
        store.save(d.clone()).await.unwrap();
        d.record.title = "Renamed".into();
        store.save(d.clone()).await.unwrap();

        let all = store.read_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].record.title, "Renamed");
    }

    #[tokio::test]
    async fn test_in_memory_list_newest_first() {
        let store = InMemoryDraftStore::with_drafts(vec![draft(0, "old"), draft(60, "new")]);
        let listed = store.list().await.unwrap();
        assert_eq!(listed[0].record.title, "new");
    }

    #[tokio::test]
    async fn test_delete_unknown_draft() {
        let store = InMemoryDraftStore::new();
        let missing = Uuid::now_v7();
        assert!(matches!(
            store.delete(missing).await,
            Err(Error::DraftNotFound(id)) if id == missing
        ));
    }

    #[tokio::test]
    async fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileDraftStore::new(dir.path().join("nested/drafts.json"));
        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drafts.json");
        tokio::fs::write(&path, b"{not a list").await.unwrap();
        let store = JsonFileDraftStore::new(&path);
        assert!(matches!(store.read_all().await, Err(Error::Storage(_))));
    }
}
