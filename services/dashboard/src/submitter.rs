//! Video request submission
//!
//! A submission is two backend calls. The video request is created first and
//! its outcome is what the user sees. Only after it succeeded is the
//! generation workflow triggered, in the background, with failures logged.

use std::{
    sync::{
        Arc, Mutex as StdMutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use api::{
    ApiError, Backend,
    models::{CreateVideoRequest, TriggerRequest, VideoMethod, VideoRequest},
};
use auth::Session;
use common::notify::NotificationCenter;
use tokio::{
    sync::{Mutex, watch},
    task::JoinHandle,
    time::sleep,
};
use tracing::{info, warn};

use crate::{cooldown::Cooldown, images::ImageUpload};

const GENERIC_FAILURE: &str = "Could not create the video request. Please try again.";
const SUCCESS_MESSAGE: &str = "Video request sent! Your video is being generated.";

/// Visible state of the submit form
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmitStatus {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed(String),
}

/// Where the phrase of the video comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhraseMode {
    #[default]
    Auto,
    Manual,
}

impl From<PhraseMode> for VideoMethod {
    fn from(mode: PhraseMode) -> Self {
        match mode {
            PhraseMode::Auto => VideoMethod::Automatic,
            PhraseMode::Manual => VideoMethod::Manual,
        }
    }
}

/// Form input not yet submitted
#[derive(Debug, Clone, Default)]
pub struct Draft {
    pub images: Vec<ImageUpload>,
    pub mode: PhraseMode,
    pub phrase: String,
}

/// Why a submission was refused without contacting the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NoImages,
    MissingPhrase,
    CoolingDown,
    InFlight,
}

/// Result of [`Submitter::submit`]
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Rejected(Rejection),
    Succeeded(VideoRequest),
    Failed(ApiError),
}

/// Timing of the submit flow
#[derive(Debug, Clone, Copy)]
pub struct SubmitterSettings {
    /// Cooldown length in ticks
    pub cooldown_ticks: u32,
    /// Delay before a success goes back to idle
    pub status_reset: Duration,
}

impl Default for SubmitterSettings {
    fn default() -> Self {
        Self {
            cooldown_ticks: 40,
            status_reset: Duration::from_secs(5),
        }
    }
}

/// Request submitter
#[derive(Clone)]
pub struct Submitter {
    backend: Arc<dyn Backend>,
    notifications: NotificationCenter,
    cooldown: Cooldown,
    settings: SubmitterSettings,
    draft: Arc<Mutex<Draft>>,
    status: Arc<watch::Sender<SubmitStatus>>,
    generation: Arc<AtomicU64>,
    triggers: Arc<StdMutex<Vec<JoinHandle<()>>>>,
}

impl Submitter {
    pub fn new(
        backend: Arc<dyn Backend>,
        notifications: NotificationCenter,
        cooldown: Cooldown,
        settings: SubmitterSettings,
    ) -> Self {
        let (status, _) = watch::channel(SubmitStatus::Idle);
        Self {
            backend,
            notifications,
            cooldown,
            settings,
            draft: Arc::new(Mutex::new(Draft::default())),
            status: Arc::new(status),
            generation: Arc::new(AtomicU64::new(0)),
            triggers: Arc::new(StdMutex::new(Vec::new())),
        }
    }

    pub async fn add_image(&self, image: ImageUpload) {
        self.draft.lock().await.images.push(image);
    }

    /// Remove the image at `index`, if there is one
    pub async fn remove_image(&self, index: usize) -> Option<ImageUpload> {
        let mut draft = self.draft.lock().await;
        (index < draft.images.len()).then(|| draft.images.remove(index))
    }

    pub async fn set_mode(&self, mode: PhraseMode) {
        self.draft.lock().await.mode = mode;
    }

    pub async fn set_phrase(&self, phrase: impl Into<String>) {
        self.draft.lock().await.phrase = phrase.into();
    }

    pub async fn draft(&self) -> Draft {
        self.draft.lock().await.clone()
    }

    pub fn status(&self) -> SubmitStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmitStatus> {
        self.status.subscribe()
    }

    pub fn cooldown(&self) -> &Cooldown {
        &self.cooldown
    }

    /// Submit the current draft on behalf of `session`
    pub async fn submit(&self, session: &Session) -> SubmitOutcome {
        let (method, phrase, images, generation) = {
            let draft = self.draft.lock().await;
            if draft.images.is_empty() {
                return SubmitOutcome::Rejected(Rejection::NoImages);
            }
            let phrase = match draft.mode {
                PhraseMode::Auto => None,
                PhraseMode::Manual => match draft.phrase.trim() {
                    "" => return SubmitOutcome::Rejected(Rejection::MissingPhrase),
                    phrase => Some(phrase.to_string()),
                },
            };
            if self.cooldown.is_active() {
                return SubmitOutcome::Rejected(Rejection::CoolingDown);
            }
            let claimed = self.status.send_if_modified(|status| {
                if *status == SubmitStatus::Submitting {
                    false
                } else {
                    *status = SubmitStatus::Submitting;
                    true
                }
            });
            if !claimed {
                return SubmitOutcome::Rejected(Rejection::InFlight);
            }

            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            self.cooldown.start(self.settings.cooldown_ticks);
            (
                VideoMethod::from(draft.mode),
                phrase,
                draft.images.clone(),
                generation,
            )
        };

        let request = CreateVideoRequest {
            metodo: method,
            frase: phrase.clone(),
            num_images: images.len(),
        };
        let created = match self
            .backend
            .create_video_request(session.token(), &request)
            .await
        {
            Ok(created) => created,
            Err(e) => {
                let message = e.detail().unwrap_or(GENERIC_FAILURE).to_string();
                warn!("Video request failed: {}", e);
                self.status.send_replace(SubmitStatus::Failed(message.clone()));
                self.notifications.error(message);
                return SubmitOutcome::Failed(e);
            }
        };
        info!("Video request {} created", created.id);

        self.spawn_trigger(
            session,
            TriggerRequest {
                request_id: created.id.clone(),
                user: session.trigger_user(),
                metodo: method,
                frase: phrase,
                images: images.iter().map(|image| image.payload().to_string()).collect(),
            },
        );

        self.status.send_replace(SubmitStatus::Succeeded);
        {
            let mut draft = self.draft.lock().await;
            draft.images.clear();
            draft.phrase.clear();
        }
        self.notifications.success(SUCCESS_MESSAGE);
        self.schedule_reset(generation);

        SubmitOutcome::Succeeded(created)
    }

    /// Wait for every background trigger started so far
    pub async fn flush_triggers(&self) {
        let pending: Vec<_> = {
            let mut triggers = self.triggers.lock().unwrap_or_else(PoisonError::into_inner);
            triggers.drain(..).collect()
        };
        for task in pending {
            if let Err(e) = task.await {
                warn!("Generation trigger task failed: {}", e);
            }
        }
    }

    fn spawn_trigger(&self, session: &Session, trigger: TriggerRequest) {
        let backend = Arc::clone(&self.backend);
        let token = session.token().to_string();
        let task = tokio::spawn(async move {
            match backend.trigger_generation(&token, &trigger).await {
                Ok(()) => info!("Generation triggered for request {}", trigger.request_id),
                Err(e) => warn!(
                    "Failed to trigger generation for request {}: {}",
                    trigger.request_id, e
                ),
            }
        });

        let mut triggers = self.triggers.lock().unwrap_or_else(PoisonError::into_inner);
        triggers.retain(|task| !task.is_finished());
        triggers.push(task);
    }

    fn schedule_reset(&self, generation: u64) {
        let status = Arc::clone(&self.status);
        let current = Arc::clone(&self.generation);
        let delay = self.settings.status_reset;
        tokio::spawn(async move {
            sleep(delay).await;
            if current.load(Ordering::SeqCst) != generation {
                return;
            }
            status.send_if_modified(|status| {
                if *status == SubmitStatus::Succeeded {
                    *status = SubmitStatus::Idle;
                    true
                } else {
                    false
                }
            });
        });
    }
}
