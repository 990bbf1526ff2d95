//! Advisory progress reporting.
//!
//! While a request is outstanding a [`ProgressTicker`] cycles through a few
//! encouraging messages on a background thread. The ticker carries no
//! correctness obligation; it is stopped and joined as soon as the request
//! settles, and again on drop.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Receives human-readable progress text.
pub type ProgressSink = Arc<dyn Fn(&str) + Send + Sync>;

pub const ENCOURAGING_MESSAGES: [&str; 6] = [
    "Warming up the Intelligence...",
    "Designing your visuals...",
    "Finding the best layouts...",
    "Rendering the poster...",
    "Adding the final touches...",
    "Almost there...",
];

/// A sink that discards everything.
pub fn silent() -> ProgressSink {
    Arc::new(|_: &str| {})
}

/// Rotating progress messages on a background thread.
pub struct ProgressTicker {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressTicker {
    /// Emit the first message immediately, then one every `interval`.
    pub fn start(interval: Duration, sink: ProgressSink) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            let mut index = 0;
            sink(ENCOURAGING_MESSAGES[index]);
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        index = (index + 1) % ENCOURAGING_MESSAGES.len();
                        sink(ENCOURAGING_MESSAGES[index]);
                    }
                    // stop requested or ticker dropped
                    _ => break,
                }
            }
        });

        Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// A ticker that never runs, for callers that disabled rotation.
    pub fn disabled() -> Self {
        Self {
            stop_tx: None,
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Stop the rotation and wait for the thread to exit.
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
