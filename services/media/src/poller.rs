//! Gallery poller
//!
//! While a session is available the gallery is fetched right away and then
//! on a fixed interval. Each fetch replaces the shared [`GalleryView`] and a
//! notification is shown when the number of videos grows.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use api::{ApiResult, Backend, models::GalleryItem};
use auth::Session;
use common::{notify::NotificationCenter, stop::StopSignal};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, info, warn};

use crate::gallery::GalleryView;

/// Last observed gallery size
///
/// Growth is only reported against a previously recorded non-zero count,
/// so the first fetch after sign-in never announces anything.
#[derive(Debug, Default)]
pub struct CountTracker {
    last: usize,
}

impl CountTracker {
    /// Record `count`; true when it is greater than a non-zero previous count
    pub fn observe(&mut self, count: usize) -> bool {
        let grew = self.last > 0 && count > self.last;
        self.last = count;
        grew
    }

    pub fn reset(&mut self) {
        self.last = 0;
    }

    pub fn last(&self) -> usize {
        self.last
    }
}

/// Periodic gallery fetcher
pub struct GalleryPoller {
    backend: Arc<dyn Backend>,
    view: GalleryView,
    notifications: NotificationCenter,
    interval: Duration,
}

impl GalleryPoller {
    pub fn new(
        backend: Arc<dyn Backend>,
        view: GalleryView,
        notifications: NotificationCenter,
        interval: Duration,
    ) -> Self {
        Self {
            backend,
            view,
            notifications,
            interval,
        }
    }

    /// Start polling in the background, following `sessions`
    pub fn spawn(self, sessions: watch::Receiver<Option<Session>>) -> PollerHandle {
        let stop = StopSignal::new();
        let liveness = Arc::new(AtomicU64::new(0));
        let ticket = Ticket {
            liveness: Arc::clone(&liveness),
            issued: liveness.load(Ordering::SeqCst),
        };

        info!("Starting gallery poller every {:?}", self.interval);
        let task = tokio::spawn(self.run(sessions, stop.clone(), ticket));
        PollerHandle {
            stop,
            liveness,
            task: Some(task),
        }
    }

    async fn run(
        self,
        mut sessions: watch::Receiver<Option<Session>>,
        stop: StopSignal,
        ticket: Ticket,
    ) {
        let mut tracker = CountTracker::default();
        let mut polled_token: Option<String> = None;

        loop {
            let token = sessions
                .borrow_and_update()
                .as_ref()
                .map(|session| session.token().to_string());

            if token != polled_token {
                tracker.reset();
                polled_token = token.clone();
            }

            let Some(token) = token else {
                self.view.clear().await;
                tokio::select! {
                    _ = stop.wait() => break,
                    changed = sessions.changed() => if changed.is_err() { break },
                }
                continue;
            };

            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = stop.wait() => return,
                    changed = sessions.changed() => {
                        if changed.is_err() {
                            return;
                        }
                        break;
                    }
                    _ = ticker.tick() => {
                        let fetched = tokio::select! {
                            _ = stop.wait() => return,
                            result = self.backend.list_gallery(&token) => result,
                        };
                        if !ticket.is_live() || !session_matches(&sessions, &token) {
                            debug!("Discarding gallery fetch issued for a stale session");
                            continue;
                        }
                        self.apply(fetched, &mut tracker).await;
                    }
                }
            }
        }
        info!("Gallery poller stopped");
    }

    async fn apply(&self, fetched: ApiResult<Vec<GalleryItem>>, tracker: &mut CountTracker) {
        match fetched {
            Ok(items) => {
                let previous = tracker.last();
                let count = items.len();
                self.view.replace(items).await;
                if tracker.observe(count) {
                    let added = count - previous;
                    info!("Gallery grew from {} to {} videos", previous, count);
                    self.notifications.success(if added == 1 {
                        "A new video is ready in your gallery".to_string()
                    } else {
                        format!("{added} new videos are ready in your gallery")
                    });
                }
            }
            Err(e) => warn!("Gallery fetch failed: {}", e),
        }
    }
}

fn session_matches(sessions: &watch::Receiver<Option<Session>>, token: &str) -> bool {
    sessions
        .borrow()
        .as_ref()
        .is_some_and(|session| session.token() == token)
}

/// Liveness ticket held by the poll loop
struct Ticket {
    liveness: Arc<AtomicU64>,
    issued: u64,
}

impl Ticket {
    fn is_live(&self) -> bool {
        self.liveness.load(Ordering::SeqCst) == self.issued
    }
}

/// Owner of a running poller; dropping it stops the loop
pub struct PollerHandle {
    stop: StopSignal,
    liveness: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Stop the loop and invalidate any fetch still in flight
    pub fn stop(&self) {
        self.liveness.fetch_add(1, Ordering::SeqCst);
        self.stop.stop();
    }

    /// Stop the loop and wait for it to exit
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Gallery poller task failed: {}", e);
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(|task| task.is_finished())
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
