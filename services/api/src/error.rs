//! Error types for calls to the backend

use serde::Deserialize;
use thiserror::Error;

/// Error returned by every backend call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Required input is missing or malformed; no request was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// Credentials rejected or bearer token expired (401/403)
    #[error("Unauthorized{}", .0.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Unauthorized(Option<String>),

    /// Backend unreachable or the connection dropped
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response with an optional structured error detail
    #[error("Server error ({status}){}", .detail.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Server { status: u16, detail: Option<String> },

    /// 2xx response whose body did not match the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Message the backend (or local validation) provided, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Validation(message) => Some(message),
            ApiError::Unauthorized(detail) | ApiError::Server { detail, .. } => detail.as_deref(),
            ApiError::Network(_) | ApiError::InvalidResponse(_) => None,
        }
    }

    /// Whether the backend could not be reached at all
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    /// Whether the failure means the bearer token is no longer accepted
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    /// Build the error for a non-2xx response from its status and raw body
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = extract_detail(body);
        if status == 401 || status == 403 {
            ApiError::Unauthorized(detail)
        } else {
            ApiError::Server { status, detail }
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::from_status(status.as_u16(), "")
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::InvalidResponse(err.to_string())
    }
}

/// Error bodies the backend is known to send
#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
    detail: Option<String>,
}

/// Pull a human-readable message out of an error body
fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .error
        .or(parsed.message)
        .or(parsed.detail)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
