//! Scripted in-memory backend
//!
//! Each endpoint has a queue of responses. A call pops the front of its
//! queue; the last entry is sticky and answers every further call. Every call
//! is recorded so tests can assert on what was (or was not) sent.

use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard},
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    client::Backend,
    error::{ApiError, ApiResult},
    models::{
        AuthResponse, CreateVideoRequest, GalleryItem, LoginRequest, RegisterRequest,
        RegisterResponse, TriggerRequest, VideoRequest,
    },
    signal::UnauthorizedSignal,
};

/// A call received by the mock
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Login(LoginRequest),
    Register(RegisterRequest),
    ValidateToken(String),
    CreateVideoRequest {
        token: String,
        request: CreateVideoRequest,
    },
    TriggerGeneration {
        token: String,
        trigger: TriggerRequest,
    },
    ListGallery(String),
    SetPosted {
        token: String,
        drive_file_id: String,
        is_posted: bool,
    },
    YoutubeHighlights {
        token: String,
        url: String,
    },
}

struct Script<T> {
    queue: VecDeque<ApiResult<T>>,
}

impl<T: Clone> Script<T> {
    fn new(default: ApiResult<T>) -> Self {
        Self {
            queue: VecDeque::from([default]),
        }
    }

    fn push(&mut self, response: ApiResult<T>, replace_default: bool) {
        if replace_default {
            self.queue.clear();
        }
        self.queue.push_back(response);
    }

    fn next(&mut self) -> ApiResult<T> {
        if self.queue.len() > 1 {
            if let Some(response) = self.queue.pop_front() {
                return response;
            }
        }
        self.queue.front().cloned().unwrap_or_else(|| {
            Err(ApiError::InvalidResponse("mock script is empty".to_string()))
        })
    }
}

struct MockState {
    calls: Vec<Call>,
    login: Script<AuthResponse>,
    register: Script<RegisterResponse>,
    validate: Script<()>,
    create: Script<VideoRequest>,
    trigger: Script<()>,
    gallery: Script<Vec<GalleryItem>>,
    set_posted: Script<()>,
    highlights: Script<Vec<String>>,
    gallery_delay: Option<Duration>,
    set_posted_delay: Option<Duration>,
}

/// Backend double with scripted responses and a call log
pub struct MockBackend {
    state: Mutex<MockState>,
    unauthorized: Option<UnauthorizedSignal>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// A backend that rejects logins, fails video requests with a 500 and
    /// answers every other call with an empty success
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                calls: Vec::new(),
                login: Script::new(Err(ApiError::Unauthorized(Some(
                    "Invalid credentials".to_string(),
                )))),
                register: Script::new(Ok(RegisterResponse::default())),
                validate: Script::new(Ok(())),
                create: Script::new(Err(ApiError::Server {
                    status: 500,
                    detail: None,
                })),
                trigger: Script::new(Ok(())),
                gallery: Script::new(Ok(Vec::new())),
                set_posted: Script::new(Ok(())),
                highlights: Script::new(Ok(Vec::new())),
                gallery_delay: None,
                set_posted_delay: None,
            }),
            unauthorized: None,
        }
    }

    /// Raise `signal` whenever an authenticated call answers Unauthorized
    pub fn with_signal(mut self, signal: UnauthorizedSignal) -> Self {
        self.unauthorized = Some(signal);
        self
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }

    /// Answer every further login with `response`
    pub fn set_login(&self, response: ApiResult<AuthResponse>) {
        self.state().login.push(response, true);
    }

    pub fn set_register(&self, response: ApiResult<RegisterResponse>) {
        self.state().register.push(response, true);
    }

    pub fn set_validate(&self, response: ApiResult<()>) {
        self.state().validate.push(response, true);
    }

    pub fn set_create(&self, response: ApiResult<VideoRequest>) {
        self.state().create.push(response, true);
    }

    pub fn set_trigger(&self, response: ApiResult<()>) {
        self.state().trigger.push(response, true);
    }

    pub fn set_posted_response(&self, response: ApiResult<()>) {
        self.state().set_posted.push(response, true);
    }

    pub fn set_highlights(&self, response: ApiResult<Vec<String>>) {
        self.state().highlights.push(response, true);
    }

    /// Answer the next gallery fetches with `responses`, in order
    pub fn script_gallery(&self, responses: impl IntoIterator<Item = ApiResult<Vec<GalleryItem>>>) {
        let mut state = self.state();
        let mut first = true;
        for response in responses {
            state.gallery.push(response, first);
            first = false;
        }
    }

    /// Make every gallery fetch take `delay` before answering
    pub fn set_gallery_delay(&self, delay: Duration) {
        self.state().gallery_delay = Some(delay);
    }

    /// Make every toggle call take `delay` before answering
    pub fn set_posted_delay(&self, delay: Duration) {
        self.state().set_posted_delay = Some(delay);
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Number of calls matching `predicate`
    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.state().calls.iter().filter(|call| predicate(call)).count()
    }

    /// Trigger payloads received so far
    pub fn triggers(&self) -> Vec<TriggerRequest> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::TriggerGeneration { trigger, .. } => Some(trigger.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.state().calls.push(call);
    }

    fn authenticated<T>(&self, result: ApiResult<T>) -> ApiResult<T> {
        if let (Err(err), Some(signal)) = (&result, &self.unauthorized) {
            if err.is_unauthorized() {
                signal.raise();
            }
        }
        result
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn login(&self, request: &LoginRequest) -> ApiResult<AuthResponse> {
        self.record(Call::Login(request.clone()));
        self.state().login.next()
    }

    async fn register(&self, request: &RegisterRequest) -> ApiResult<RegisterResponse> {
        self.record(Call::Register(request.clone()));
        self.state().register.next()
    }

    async fn validate_token(&self, token: &str) -> ApiResult<()> {
        self.record(Call::ValidateToken(token.to_string()));
        self.state().validate.next()
    }

    async fn create_video_request(
        &self,
        token: &str,
        request: &CreateVideoRequest,
    ) -> ApiResult<VideoRequest> {
        self.record(Call::CreateVideoRequest {
            token: token.to_string(),
            request: request.clone(),
        });
        let result = self.state().create.next();
        self.authenticated(result)
    }

    async fn trigger_generation(&self, token: &str, trigger: &TriggerRequest) -> ApiResult<()> {
        self.record(Call::TriggerGeneration {
            token: token.to_string(),
            trigger: trigger.clone(),
        });
        let result = self.state().trigger.next();
        self.authenticated(result)
    }

    async fn list_gallery(&self, token: &str) -> ApiResult<Vec<GalleryItem>> {
        self.record(Call::ListGallery(token.to_string()));
        let (result, delay) = {
            let mut state = self.state();
            (state.gallery.next(), state.gallery_delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.authenticated(result)
    }

    async fn set_posted(
        &self,
        token: &str,
        drive_file_id: &str,
        is_posted: bool,
    ) -> ApiResult<()> {
        self.record(Call::SetPosted {
            token: token.to_string(),
            drive_file_id: drive_file_id.to_string(),
            is_posted,
        });
        let (result, delay) = {
            let mut state = self.state();
            (state.set_posted.next(), state.set_posted_delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.authenticated(result)
    }

    async fn youtube_highlights(&self, token: &str, url: &str) -> ApiResult<Vec<String>> {
        self.record(Call::YoutubeHighlights {
            token: token.to_string(),
            url: url.to_string(),
        });
        let result = self.state().highlights.next();
        self.authenticated(result)
    }
}
