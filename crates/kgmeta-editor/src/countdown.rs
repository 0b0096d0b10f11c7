//! Background driver for the session countdown.
//!
//! Ticks the shared editor once per interval. When the countdown expires it
//! waits the forced-submit delay, submits in forced mode, and hands the
//! payload to the submission sink.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use kgmeta_core::{Error, Result, SubmissionPayload, SubmissionSink};

use crate::config::EditorConfig;
use crate::session::TickOutcome;
use crate::state::SubmissionOutcome;
use crate::SharedEditor;

/// Drives the countdown of one shared editor.
pub struct CountdownDriver {
    editor: SharedEditor,
    sink: Arc<dyn SubmissionSink>,
    config: EditorConfig,
}

impl CountdownDriver {
    pub fn new(editor: SharedEditor, sink: Arc<dyn SubmissionSink>, config: EditorConfig) -> Self {
        Self { editor, sink, config }
    }

    /// Spawn the driver.
    pub fn start(editor: SharedEditor, sink: Arc<dyn SubmissionSink>, config: EditorConfig) -> CountdownHandle {
        Self::new(editor, sink, config).spawn()
    }

    pub fn spawn(self) -> CountdownHandle {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let task = tokio::spawn(self.run(shutdown_rx));
        CountdownHandle { shutdown_tx, task }
    }

    #[instrument(skip(self, shutdown_rx), fields(subsystem = "editor", component = "countdown"))]
    async fn run(self, mut shutdown_rx: mpsc::Receiver<()>) -> Option<SubmissionPayload> {
        let mut ticker = interval(self.config.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Countdown driver shutting down");
                    return None;
                }
                _ = ticker.tick() => {}
            }

            let outcome = self.editor.lock().await.tick(Utc::now());
            match outcome {
                TickOutcome::Running { .. } => continue,
                TickOutcome::Expired => break,
                TickOutcome::Inactive => {
                    debug!("Countdown inactive, driver exiting");
                    return None;
                }
            }
        }

        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("Countdown driver shut down before forced submission");
                return None;
            }
            _ = sleep(self.config.forced_submit_delay()) => {}
        }

        self.force_submit().await
    }

    async fn force_submit(&self) -> Option<SubmissionPayload> {
        let outcome = self.editor.lock().await.submit_on_expiry(Utc::now());
        let payload = match outcome {
            Ok(SubmissionOutcome::Submitted(payload)) => *payload,
            Ok(SubmissionOutcome::Blocked(report)) => {
                warn!(message = %report.message, "Forced submission unexpectedly blocked");
                return None;
            }
            Err(e) => {
                // Closed or already submitted during the delay.
                debug!(error = %e, "Forced submission skipped");
                return None;
            }
        };

        if let Err(e) = self.sink.submit(&payload).await {
            error!(
                submission_id = %payload.metadata.submission_id,
                error = %e,
                "Failed to deliver forced submission"
            );
        }
        Some(payload)
    }
}

/// Handle to a running countdown driver.
pub struct CountdownHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<Option<SubmissionPayload>>,
}

impl CountdownHandle {
    /// Signal the driver to stop.
    pub async fn shutdown(&self) -> Result<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| Error::Internal("Failed to send shutdown signal".into()))
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the driver to exit. Yields the forced submission, if one
    /// was made.
    pub async fn join(self) -> Result<Option<SubmissionPayload>> {
        self.task
            .await
            .map_err(|e| Error::Internal(format!("Countdown task failed: {}", e)))
    }
}
