//! Session handling for the video dashboard
//!
//! The [`SessionStore`] signs users in and out, persists the session across
//! restarts and revalidates it against the backend on startup.

pub mod error;
pub mod jwt;
pub mod models;
pub mod session;
pub mod validation;

pub use error::{AuthError, AuthResult};
pub use models::{LoginCredentials, RegisterData, Role, Session};
pub use session::SessionStore;
