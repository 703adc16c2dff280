//! Backend client
//!
//! [`Backend`] is the seam between the dashboard components and the HTTP
//! API. [`HttpBackend`] is the production implementation; tests use the
//! scripted backend from the `mock` module instead.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::{
    error::{ApiError, ApiResult},
    models::{
        AuthResponse, CreateVideoRequest, CreateVideoResponse, GalleryItem, GalleryResponse,
        HighlightsRequest, HighlightsResponse, LoginRequest, RegisterRequest, RegisterResponse,
        TogglePostedRequest, TriggerRequest, VideoRequest,
    },
    signal::UnauthorizedSignal,
};

/// Operations the dashboard needs from the backend
#[async_trait]
pub trait Backend: Send + Sync {
    /// `POST /login`
    async fn login(&self, request: &LoginRequest) -> ApiResult<AuthResponse>;

    /// `POST /register`
    async fn register(&self, request: &RegisterRequest) -> ApiResult<RegisterResponse>;

    /// `GET /me`; succeeds only if the backend still accepts `token`
    async fn validate_token(&self, token: &str) -> ApiResult<()>;

    /// `POST /api/video-request`
    async fn create_video_request(
        &self,
        token: &str,
        request: &CreateVideoRequest,
    ) -> ApiResult<VideoRequest>;

    /// `POST /api/trigger-n8n`; the response body is ignored
    async fn trigger_generation(&self, token: &str, trigger: &TriggerRequest) -> ApiResult<()>;

    /// `GET /api/gallery`
    async fn list_gallery(&self, token: &str) -> ApiResult<Vec<GalleryItem>>;

    /// `POST /api/gallery/toggle-posted`
    async fn set_posted(&self, token: &str, drive_file_id: &str, is_posted: bool)
    -> ApiResult<()>;

    /// `POST /api/youtube-highlights`
    async fn youtube_highlights(&self, token: &str, url: &str) -> ApiResult<Vec<String>>;
}

/// Backend connection settings
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL without trailing slash (e.g., "http://localhost:3001")
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, timeout }
    }
}

/// reqwest-based backend
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    config: BackendConfig,
    unauthorized: UnauthorizedSignal,
}

impl HttpBackend {
    /// Create a new HTTP backend that raises `unauthorized` on 401/403
    pub fn new(config: BackendConfig, unauthorized: UnauthorizedSignal) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to build HTTP client: {e}")))?;

        info!("Backend client initialized with URL: {}", config.base_url);
        Ok(Self {
            client,
            config,
            unauthorized,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Send `request` and map transport failures and non-2xx statuses
    ///
    /// `authenticated` calls raise the unauthorized signal on 401/403.
    async fn send(&self, request: RequestBuilder, authenticated: bool) -> ApiResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_status(status.as_u16(), &body);
        if authenticated && err.is_unauthorized() {
            warn!(status = status.as_u16(), "backend rejected bearer token");
            self.unauthorized.raise();
        }
        Err(err)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        authenticated: bool,
    ) -> ApiResult<T> {
        let response = self.send(request, authenticated).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn login(&self, request: &LoginRequest) -> ApiResult<AuthResponse> {
        let builder = self.client.post(self.url("/login")).json(request);
        self.send_json(builder, false).await
    }

    async fn register(&self, request: &RegisterRequest) -> ApiResult<RegisterResponse> {
        let builder = self.client.post(self.url("/register")).json(request);
        let response = self.send(builder, false).await?;
        let bytes = response.bytes().await?;
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(RegisterResponse::default());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn validate_token(&self, token: &str) -> ApiResult<()> {
        let builder = self.client.get(self.url("/me")).bearer_auth(token);
        self.send(builder, false).await?;
        Ok(())
    }

    async fn create_video_request(
        &self,
        token: &str,
        request: &CreateVideoRequest,
    ) -> ApiResult<VideoRequest> {
        let builder = self
            .client
            .post(self.url("/api/video-request"))
            .bearer_auth(token)
            .json(request);
        let body: CreateVideoResponse = self.send_json(builder, true).await?;
        Ok(body.request)
    }

    async fn trigger_generation(&self, token: &str, trigger: &TriggerRequest) -> ApiResult<()> {
        let builder = self
            .client
            .post(self.url("/api/trigger-n8n"))
            .bearer_auth(token)
            .json(trigger);
        self.send(builder, true).await?;
        Ok(())
    }

    async fn list_gallery(&self, token: &str) -> ApiResult<Vec<GalleryItem>> {
        let builder = self.client.get(self.url("/api/gallery")).bearer_auth(token);
        let body: GalleryResponse = self.send_json(builder, true).await?;
        Ok(body.videos)
    }

    async fn set_posted(
        &self,
        token: &str,
        drive_file_id: &str,
        is_posted: bool,
    ) -> ApiResult<()> {
        let builder = self
            .client
            .post(self.url("/api/gallery/toggle-posted"))
            .bearer_auth(token)
            .json(&TogglePostedRequest {
                drive_file_id: drive_file_id.to_string(),
                is_posted,
            });
        self.send(builder, true).await?;
        Ok(())
    }

    async fn youtube_highlights(&self, token: &str, url: &str) -> ApiResult<Vec<String>> {
        let builder = self
            .client
            .post(self.url("/api/youtube-highlights"))
            .bearer_auth(token)
            .json(&HighlightsRequest {
                url: url.to_string(),
            });
        let body: HighlightsResponse = self.send_json(builder, true).await?;
        match (body.highlights, body.error) {
            (_, Some(error)) => Err(ApiError::Server {
                status: 200,
                detail: Some(error),
            }),
            (Some(highlights), None) => Ok(highlights),
            (None, None) => Err(ApiError::InvalidResponse(
                "highlights response carried neither highlights nor error".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = BackendConfig::new("http://localhost:3001/", Duration::from_secs(5));
        let backend =
            HttpBackend::new(config, UnauthorizedSignal::new()).expect("client builds");
        assert_eq!(backend.url("/login"), "http://localhost:3001/login");
    }
}
