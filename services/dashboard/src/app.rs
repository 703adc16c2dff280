//! Dashboard wiring
//!
//! [`Dashboard`] owns every long-lived piece of the client: the backend
//! client, the session store, the gallery poller and the timers behind the
//! submit form. [`Dashboard::shutdown`] stops all of them.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use anyhow::{Context, Result, anyhow, bail};
use api::{Backend, BackendConfig, HttpBackend, UnauthorizedSignal};
use auth::{LoginCredentials, RegisterData, Session, SessionStore};
use common::{
    config::DashboardConfig,
    notify::NotificationCenter,
    storage::{FileStore, KeyValueStore},
};
use media::{DownloadRegistry, Downloader, GalleryPoller, GalleryView, PollerHandle, StatusToggle};
use tokio::task::JoinHandle;
use tracing::info;

use crate::{
    cooldown::Cooldown,
    highlights::request_highlights,
    submitter::{SubmitOutcome, Submitter, SubmitterSettings},
};

const COOLDOWN_TICK: Duration = Duration::from_secs(1);

/// The dashboard client
pub struct Dashboard {
    config: DashboardConfig,
    backend: Arc<dyn Backend>,
    sessions: Arc<SessionStore>,
    notifications: NotificationCenter,
    gallery: GalleryView,
    submitter: Submitter,
    toggle: StatusToggle,
    downloader: Downloader,
    unauthorized_watch: JoinHandle<()>,
    poller: Mutex<Option<PollerHandle>>,
}

impl Dashboard {
    /// Build a dashboard talking HTTP to the configured backend, with state
    /// in the configured storage file
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(config: DashboardConfig) -> Result<Self> {
        let signal = UnauthorizedSignal::new();
        let backend = HttpBackend::new(
            BackendConfig::new(config.api_base_url.clone(), config.request_timeout()),
            signal.clone(),
        )?;
        let storage = FileStore::open(&config.storage_path).with_context(|| {
            format!("Failed to open storage at {}", config.storage_path.display())
        })?;
        Self::with_parts(config, Arc::new(backend), Arc::new(storage), signal)
    }

    /// Build a dashboard from explicit parts
    ///
    /// `signal` must be the one `backend` raises on rejected tokens.
    pub fn with_parts(
        config: DashboardConfig,
        backend: Arc<dyn Backend>,
        storage: Arc<dyn KeyValueStore>,
        signal: UnauthorizedSignal,
    ) -> Result<Self> {
        let sessions = Arc::new(SessionStore::new(
            Arc::clone(&backend),
            Arc::clone(&storage),
            config.offline_restore,
        ));
        let unauthorized_watch = sessions.watch_unauthorized(&signal);

        let notifications = NotificationCenter::new(config.notification_window());
        let gallery = GalleryView::new();
        let submitter = Submitter::new(
            Arc::clone(&backend),
            notifications.clone(),
            Cooldown::new(COOLDOWN_TICK),
            SubmitterSettings {
                cooldown_ticks: config.cooldown_secs,
                status_reset: config.status_reset_delay(),
            },
        );
        let toggle = StatusToggle::new(Arc::clone(&backend), gallery.clone());
        let registry = DownloadRegistry::load(storage)?;
        let downloader = Downloader::new(Arc::new(registry), config.request_timeout())?;

        Ok(Self {
            config,
            backend,
            sessions,
            notifications,
            gallery,
            submitter,
            toggle,
            downloader,
            unauthorized_watch,
            poller: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn gallery(&self) -> &GalleryView {
        &self.gallery
    }

    pub fn submitter(&self) -> &Submitter {
        &self.submitter
    }

    pub fn downloads(&self) -> &DownloadRegistry {
        self.downloader.registry()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let credentials = LoginCredentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        Ok(self.sessions.login(&credentials).await?)
    }

    pub async fn register(&self, data: RegisterData) -> Result<Option<Session>> {
        Ok(self.sessions.register(data).await?)
    }

    pub async fn restore(&self) -> Option<Session> {
        self.sessions.restore().await
    }

    pub fn logout(&self) {
        self.sessions.logout();
    }

    /// Start the gallery poller unless it is already running
    pub fn start_polling(&self) {
        let mut poller = self.poller.lock().unwrap_or_else(PoisonError::into_inner);
        if poller.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }
        let handle = GalleryPoller::new(
            Arc::clone(&self.backend),
            self.gallery.clone(),
            self.notifications.clone(),
            self.config.poll_interval(),
        )
        .spawn(self.sessions.subscribe());
        *poller = Some(handle);
    }

    /// Fetch the gallery once into [`Dashboard::gallery`]; returns the
    /// number of videos
    pub async fn refresh_gallery(&self) -> Result<usize> {
        let session = self.require_session()?;
        let items = self.backend.list_gallery(session.token()).await?;
        let count = items.len();
        self.gallery.replace(items).await;
        Ok(count)
    }

    /// Submit the current draft
    pub async fn submit(&self) -> Result<SubmitOutcome> {
        let session = self.require_session()?;
        Ok(self.submitter.submit(&session).await)
    }

    /// Flip the posted flag of a gallery item; returns the resulting value
    pub async fn toggle_posted(&self, item_id: &str) -> Result<bool> {
        let session = self.require_session()?;
        if self.gallery.get(item_id).await.is_none() {
            self.refresh_gallery().await?;
        }
        self.toggle
            .toggle(session.token(), item_id)
            .await
            .ok_or_else(|| anyhow!("No video with id {item_id} in the gallery"))
    }

    /// Download a gallery item into the configured directory
    pub async fn download(&self, item_id: &str) -> Result<PathBuf> {
        if self.gallery.get(item_id).await.is_none() {
            self.refresh_gallery().await?;
        }
        let item = self
            .gallery
            .get(item_id)
            .await
            .ok_or_else(|| anyhow!("No video with id {item_id} in the gallery"))?;
        self.downloader.download(&item, &self.config.download_dir).await
    }

    /// Request highlight clips for a YouTube video
    pub async fn highlights(&self, url: &str) -> Result<Vec<String>> {
        let session = self.require_session()?;
        Ok(request_highlights(self.backend.as_ref(), &session, url).await?)
    }

    /// Stop every background task
    pub async fn shutdown(self) {
        let poller = self
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = poller {
            handle.shutdown().await;
        }
        self.submitter.flush_triggers().await;
        self.submitter.cooldown().shutdown();
        self.notifications.clear();
        self.unauthorized_watch.abort();
        info!("Dashboard shut down");
    }

    fn require_session(&self) -> Result<Session> {
        match self.sessions.current() {
            Some(session) => Ok(session),
            None => bail!("Not signed in"),
        }
    }
}
