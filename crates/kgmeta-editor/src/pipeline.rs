//! Suggestion round trip against a shared editor.
//!
//! The editor lock is released while the backend call is in flight, so the
//! form stays editable; the response is applied only if its request token
//! is still current when it arrives.

use std::time::Instant;

use tracing::{debug, instrument};

use kgmeta_core::{Result, SuggestionBackend, SuggestionResponse};

use crate::state::{AcceptOutcome, FormEditorState, RequestToken};
use crate::SharedEditor;

/// Request suggestions for the editor's empty fields from `narrative_text`.
///
/// Backend failures are recorded on the editor and returned as
/// [`AcceptOutcome::Failed`]. Only a closed or submitted form is an error.
#[instrument(skip(editor, backend, narrative_text), fields(subsystem = "inference", model = backend.model_name()))]
pub async fn request_suggestions(
    editor: &SharedEditor,
    backend: &dyn SuggestionBackend,
    narrative_text: &str,
) -> Result<AcceptOutcome> {
    let (token, request) = {
        let mut state = editor.lock().await;
        let token = state.begin_suggestion_request()?;
        (token, state.build_suggestion_request(narrative_text))
    };
    debug!(
        request_token = %token,
        field_count = request.field_definitions.len(),
        prompt_len = narrative_text.len(),
        "Requesting suggestions"
    );

    let start = Instant::now();
    let result = backend.suggest(&request).await;
    let mut state = editor.lock().await;
    Ok(settle(&mut state, token, result, start))
}

/// Re-fetch suggestions with a user-edited prompt.
#[instrument(skip(editor, backend, prompt), fields(subsystem = "inference", model = backend.model_name()))]
pub async fn request_suggestions_with_prompt(
    editor: &SharedEditor,
    backend: &dyn SuggestionBackend,
    prompt: &str,
) -> Result<AcceptOutcome> {
    let token = editor.lock().await.begin_suggestion_request()?;
    debug!(request_token = %token, prompt_len = prompt.len(), "Requesting suggestions with custom prompt");

    let start = Instant::now();
    let result = backend.suggest_with_prompt(prompt).await;
    let mut state = editor.lock().await;
    Ok(settle(&mut state, token, result, start))
}

fn settle(
    state: &mut FormEditorState,
    token: RequestToken,
    result: Result<SuggestionResponse>,
    start: Instant,
) -> AcceptOutcome {
    let duration_ms = start.elapsed().as_millis() as u64;
    debug!(request_token = %token, duration_ms, success = result.is_ok(), "Suggestion call finished");
    match result {
        Ok(response) => state.accept_suggestions(token, response),
        Err(e) => state.fail_suggestions(token, &e),
    }
}
