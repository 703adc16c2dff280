//! Backend client for the video dashboard
//!
//! This crate wraps the HTTP API consumed by the dashboard: authentication,
//! video requests, the generation trigger, the gallery and the highlights
//! endpoint. It also owns the unauthorized side channel raised when the
//! backend rejects a bearer token.

pub mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod models;
pub mod signal;

pub use client::{Backend, BackendConfig, HttpBackend};
pub use error::{ApiError, ApiResult};
pub use signal::UnauthorizedSignal;
