//! Storage location configuration.

use std::path::PathBuf;

use kgmeta_core::defaults;

/// Environment variable overriding the data directory.
pub const ENV_DATA_DIR: &str = "KGMETA_DATA_DIR";

/// Where drafts and submissions live on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(defaults::DATA_DIR),
        }
    }
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Read `KGMETA_DATA_DIR`, defaulting to `./data`.
    pub fn from_env() -> Self {
        std::env::var(ENV_DATA_DIR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(Self::new)
            .unwrap_or_default()
    }

    pub fn drafts_path(&self) -> PathBuf {
        self.data_dir.join(defaults::DRAFTS_FILE)
    }

    pub fn submissions_path(&self) -> PathBuf {
        self.data_dir.join(defaults::SUBMISSIONS_FILE)
    }
}
