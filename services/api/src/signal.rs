//! Unauthorized side channel
//!
//! Deep call sites raise the signal when the backend rejects the bearer
//! token; the session store subscribes and signs the user out. Neither side
//! needs a reference to the other.

use tokio::sync::broadcast;
use tracing::debug;

const CAPACITY: usize = 16;

/// Broadcast of "the current token was rejected" events
#[derive(Clone, Debug)]
pub struct UnauthorizedSignal {
    sender: broadcast::Sender<()>,
}

impl UnauthorizedSignal {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CAPACITY);
        Self { sender }
    }

    /// Notify every subscriber; a signal with no subscriber is dropped
    pub fn raise(&self) {
        let delivered = self.sender.send(()).unwrap_or(0);
        debug!(subscribers = delivered, "unauthorized signal raised");
    }

    /// Register a new observer
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }
}

impl Default for UnauthorizedSignal {
    fn default() -> Self {
        Self::new()
    }
}
