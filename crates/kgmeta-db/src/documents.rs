//! Plain-text document reader for narrative uploads.

use std::path::Path;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use kgmeta_core::{DocumentReader, Error, Result};

/// Reads UTF-8 text files. Other formats are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextDocumentReader;

#[async_trait]
impl DocumentReader for PlainTextDocumentReader {
    async fn read_text(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;
        let text = String::from_utf8(bytes).map_err(|_| {
            Error::InvalidInput(format!("{} is not UTF-8 plain text", path.display()))
        })?;
        let text = text.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(text);
        debug!(path = %path.display(), prompt_len = text.len(), "Read narrative document");
        Ok(text)
    }
}
