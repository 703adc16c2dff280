//! Session store models

pub mod role;
pub mod session;
pub mod user;

// Re-export for convenience
pub use role::Role;
pub use session::{Session, StoredProfile};
pub use user::{LoginCredentials, RegisterData};
