//! Submission cooldown

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{Instant, interval_at},
};
use tracing::debug;

/// Remaining cooldown ticks; never goes below zero
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CooldownCounter {
    remaining: u32,
}

impl CooldownCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, ticks: u32) {
        self.remaining = ticks;
    }

    /// Count one tick down and return what is left
    pub fn tick(&mut self) -> u32 {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }
}

/// [`CooldownCounter`] driven by a fixed-period timer
///
/// Starting again replaces the running timer. Nothing is persisted, so a
/// restart clears the cooldown.
#[derive(Clone)]
pub struct Cooldown {
    remaining: Arc<watch::Sender<u32>>,
    driver: Arc<Mutex<Option<JoinHandle<()>>>>,
    period: Duration,
}

impl Cooldown {
    /// Create an idle cooldown that ticks every `period`
    pub fn new(period: Duration) -> Self {
        let (remaining, _) = watch::channel(0);
        Self {
            remaining: Arc::new(remaining),
            driver: Arc::new(Mutex::new(None)),
            period,
        }
    }

    /// Start counting `ticks` down
    pub fn start(&self, ticks: u32) {
        let mut counter = CooldownCounter::new();
        counter.start(ticks);

        let mut driver = self.driver.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = driver.take() {
            previous.abort();
        }
        self.remaining.send_replace(counter.remaining());
        if !counter.is_active() {
            return;
        }

        debug!(ticks, "cooldown started");
        let remaining = Arc::clone(&self.remaining);
        let period = self.period;
        *driver = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            while counter.is_active() {
                ticker.tick().await;
                remaining.send_replace(counter.tick());
            }
            debug!("cooldown finished");
        }));
    }

    pub fn remaining(&self) -> u32 {
        *self.remaining.borrow()
    }

    pub fn is_active(&self) -> bool {
        self.remaining() > 0
    }

    /// Receiver of every change of the remaining ticks
    pub fn subscribe(&self) -> watch::Receiver<u32> {
        self.remaining.subscribe()
    }

    /// Stop the timer and clear the cooldown
    pub fn shutdown(&self) {
        let mut driver = self.driver.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = driver.take() {
            task.abort();
        }
        self.remaining.send_replace(0);
    }
}
