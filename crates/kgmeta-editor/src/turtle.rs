//! Debounced raw-text (Turtle) validation.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::debug;

use crate::SharedEditor;

/// Runs the Turtle check once edits have been quiet for the debounce window.
pub struct TurtleCheckDebouncer {
    editor: SharedEditor,
    notify_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl TurtleCheckDebouncer {
    pub fn start(editor: SharedEditor, quiet: Duration) -> Self {
        let (notify_tx, notify_rx) = mpsc::channel(16);
        let task = tokio::spawn(run(editor.clone(), quiet, notify_rx));
        Self {
            editor,
            notify_tx,
            task,
        }
    }

    /// Restart the quiet period.
    pub fn notify(&self) {
        // A full channel already holds a pending restart.
        let _ = self.notify_tx.try_send(());
    }

    /// Replace the editor's Turtle content and restart the quiet period.
    pub async fn edit(&self, content: impl Into<String>) {
        self.editor.lock().await.set_turtle_content(content);
        self.notify();
    }

    /// Stop the debouncer. A pending check is dropped.
    pub async fn shutdown(self) {
        drop(self.notify_tx);
        let _ = self.task.await;
    }
}

async fn run(editor: SharedEditor, quiet: Duration, mut notify_rx: mpsc::Receiver<()>) {
    while notify_rx.recv().await.is_some() {
        loop {
            tokio::select! {
                signal = notify_rx.recv() => match signal {
                    Some(()) => continue,
                    None => return,
                },
                _ = sleep(quiet) => break,
            }
        }
        let problems = editor.lock().await.check_turtle_now().len();
        debug!(component = "turtle", problems, "Debounced Turtle check ran");
    }
}
