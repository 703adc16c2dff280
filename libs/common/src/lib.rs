//! Common library for the video dashboard client
//!
//! This crate provides shared functionality used by the dashboard crates,
//! including durable client storage, configuration, notifications, error
//! handling, and tracing setup.

pub mod config;
pub mod error;
pub mod notify;
pub mod stop;
pub mod storage;
pub mod telemetry;

/// Example usage of the storage module
///
/// ```rust,no_run
/// use common::storage::{FileStore, KeyValueStore, TOKEN_KEY};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileStore::open(".dashboard/state.json")?;
///     println!("Stored token present: {}", store.get(TOKEN_KEY)?.is_some());
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
