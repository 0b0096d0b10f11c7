//! Interfaces to the external collaborators: suggestion provider, draft
//! store, submission backend, and document reader.

use async_trait::async_trait;
use uuid::Uuid;

use crate::draft::{sort_newest_first, Draft};
use crate::error::{Error, Result};
use crate::submission::SubmissionPayload;
use crate::suggestions::{SuggestionRequest, SuggestionResponse};

// =============================================================================
// SUGGESTION PROVIDER
// =============================================================================

/// Backend that turns narrative text into structured field suggestions.
#[async_trait]
pub trait SuggestionBackend: Send + Sync {
    /// Request suggestions for every field definition in `request`.
    async fn suggest(&self, request: &SuggestionRequest) -> Result<SuggestionResponse>;

    /// Request suggestions with a pre-built prompt (the "edit and re-fetch" path).
    async fn suggest_with_prompt(&self, prompt: &str) -> Result<SuggestionResponse>;

    /// Model identifier used for suggestions.
    fn model_name(&self) -> &str;
}

// =============================================================================
// DRAFT STORE
// =============================================================================

/// Whole-list draft persistence. There is no partial update.
#[async_trait]
pub trait DraftRepository: Send + Sync {
    /// Read the whole draft list.
    async fn read_all(&self) -> Result<Vec<Draft>>;

    /// Replace the whole draft list.
    async fn replace_all(&self, drafts: Vec<Draft>) -> Result<()>;

    /// Drafts ordered newest first.
    async fn list(&self) -> Result<Vec<Draft>> {
        let mut drafts = self.read_all().await?;
        sort_newest_first(&mut drafts);
        Ok(drafts)
    }

    /// Insert a draft, replacing any draft with the same `draft_id`.
    async fn save(&self, draft: Draft) -> Result<()> {
        let mut drafts = self.read_all().await?;
        match drafts.iter_mut().find(|d| d.draft_id == draft.draft_id) {
            Some(existing) => *existing = draft,
            None => drafts.push(draft),
        }
        self.replace_all(drafts).await
    }

    async fn load(&self, draft_id: Uuid) -> Result<Draft> {
        self.read_all()
            .await?
            .into_iter()
            .find(|d| d.draft_id == draft_id)
            .ok_or(Error::DraftNotFound(draft_id))
    }

    async fn delete(&self, draft_id: Uuid) -> Result<()> {
        let mut drafts = self.read_all().await?;
        let before = drafts.len();
        drafts.retain(|d| d.draft_id != draft_id);
        if drafts.len() == before {
            return Err(Error::DraftNotFound(draft_id));
        }
        self.replace_all(drafts).await
    }

    async fn clear(&self) -> Result<()> {
        self.replace_all(Vec::new()).await
    }
}

// =============================================================================
// SUBMISSION BACKEND
// =============================================================================

/// Destination for finished submissions.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<()>;
}

// =============================================================================
// DOCUMENT READER
// =============================================================================

/// Produces plain text from an uploaded document.
#[async_trait]
pub trait DocumentReader: Send + Sync {
    async fn read_text(&self, path: &std::path::Path) -> Result<String>;
}
