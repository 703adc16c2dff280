//! Configuration for the dashboard client
//!
//! Values are layered: built-in defaults, then an optional `dashboard.toml`
//! (or the file named by `DASHBOARD_CONFIG`), then `DASHBOARD_*` environment
//! variables.

use std::{path::PathBuf, time::Duration};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// What to do with a stored session when the backend cannot be reached to
/// validate it at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OfflineRestore {
    /// Keep using the stored session until the backend says otherwise
    #[default]
    TrustStored,
    /// Start signed out, but keep the stored session for the next attempt
    Distrust,
}

/// Dashboard client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Base URL of the backend (e.g., "http://localhost:3001")
    pub api_base_url: String,
    /// JSON file holding the durable client state
    pub storage_path: PathBuf,
    /// Directory where downloaded videos are written
    pub download_dir: PathBuf,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Gallery polling interval in seconds
    pub poll_interval_secs: u64,
    /// Submission cooldown, in one-second ticks
    pub cooldown_secs: u32,
    /// Delay before a successful submission returns to idle
    pub status_reset_secs: u64,
    /// How long a notification stays visible
    pub notification_secs: u64,
    /// Session restore policy when the backend is unreachable
    pub offline_restore: OfflineRestore,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3001".to_string(),
            storage_path: PathBuf::from(".dashboard/state.json"),
            download_dir: PathBuf::from("downloads"),
            request_timeout_secs: 30,
            poll_interval_secs: 15,
            cooldown_secs: 40,
            status_reset_secs: 5,
            notification_secs: 5,
            offline_restore: OfflineRestore::TrustStored,
        }
    }
}

impl DashboardConfig {
    /// Load the configuration from the default file and the environment
    ///
    /// # Environment Variables
    /// - `DASHBOARD_CONFIG`: configuration file path without extension (default: "dashboard")
    /// - `DASHBOARD_API_BASE_URL`, `DASHBOARD_POLL_INTERVAL_SECS`, ...: one per field
    pub fn load() -> Result<Self, ConfigError> {
        let file = std::env::var("DASHBOARD_CONFIG").unwrap_or_else(|_| "dashboard".to_string());
        Self::load_from(&file)
    }

    /// Load the configuration from `file` (optional) and the environment
    pub fn load_from(file: &str) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Config::builder()
            .set_default("api_base_url", defaults.api_base_url)?
            .set_default(
                "storage_path",
                defaults.storage_path.to_string_lossy().to_string(),
            )?
            .set_default(
                "download_dir",
                defaults.download_dir.to_string_lossy().to_string(),
            )?
            .set_default("request_timeout_secs", defaults.request_timeout_secs as i64)?
            .set_default("poll_interval_secs", defaults.poll_interval_secs as i64)?
            .set_default("cooldown_secs", defaults.cooldown_secs as i64)?
            .set_default("status_reset_secs", defaults.status_reset_secs as i64)?
            .set_default("notification_secs", defaults.notification_secs as i64)?
            .set_default("offline_restore", "trust_stored")?
            .add_source(File::with_name(file).required(false))
            .add_source(Environment::with_prefix("DASHBOARD").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn status_reset_delay(&self) -> Duration {
        Duration::from_secs(self.status_reset_secs)
    }

    pub fn notification_window(&self) -> Duration {
        Duration::from_secs(self.notification_secs)
    }
}
