//! One-shot "model ready" signal
//!
//! Collaborators that need the scene (overlays, readouts, UI wiring) wait on
//! a [`ReadyWaiter`] instead of polling for the camera or geometry.

use tokio::sync::watch;
use tracing::debug;

/// Resolving side, owned by the session
#[derive(Debug)]
pub struct ReadySignal {
    tx: watch::Sender<bool>,
}

/// Waiting side; cheap to clone
#[derive(Clone, Debug)]
pub struct ReadyWaiter {
    rx: watch::Receiver<bool>,
}

impl Default for ReadySignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadySignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Mark ready; later calls are no-ops
    ///
    /// Returns `true` on the call that resolved the signal.
    pub fn resolve(&self) -> bool {
        let was_ready = self.tx.send_replace(true);
        if !was_ready {
            debug!("Walkthrough ready");
        }
        !was_ready
    }

    pub fn is_ready(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn waiter(&self) -> ReadyWaiter {
        ReadyWaiter {
            rx: self.tx.subscribe(),
        }
    }
}

impl ReadyWaiter {
    pub fn is_ready(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until the signal resolves
    ///
    /// Returns immediately if it already has. Returns `false` if the signal
    /// was dropped without ever resolving.
    pub async fn wait(&mut self) -> bool {
        self.rx.wait_for(|ready| *ready).await.is_ok()
    }
}
