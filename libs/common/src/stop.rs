//! Cooperative stop signal for background loops

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio::sync::Notify;

/// Shared flag that background loops check between iterations
#[derive(Clone, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request every holder of this signal to stop
    pub fn stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn stopped(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Resolve once [`StopSignal::stop`] has been called
    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            if self.stopped() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_stop_wakes_every_waiter() {
        let signal = StopSignal::new();
        let first = tokio::spawn({
            let signal = signal.clone();
            async move { signal.wait().await }
        });
        let second = tokio::spawn({
            let signal = signal.clone();
            async move { signal.wait().await }
        });

        tokio::task::yield_now().await;
        assert!(!first.is_finished());
        signal.stop();

        tokio::time::timeout(Duration::from_secs(1), async {
            first.await.expect("task panicked");
            second.await.expect("task panicked");
        })
        .await
        .expect("waiters released");
        assert!(signal.stopped());
    }

    #[tokio::test]
    async fn test_wait_after_stop_returns_immediately() {
        let signal = StopSignal::new();
        signal.stop();
        signal.wait().await;
    }
}
