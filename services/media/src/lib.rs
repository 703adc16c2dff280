//! Gallery side of the video dashboard
//!
//! Keeps the local copy of the gallery fresh, flips the "posted" flag of
//! gallery items and downloads finished videos.

pub mod downloads;
pub mod gallery;
pub mod poller;
pub mod toggle;

pub use downloads::{DownloadRegistry, Downloader};
pub use gallery::GalleryView;
pub use poller::{CountTracker, GalleryPoller, PollerHandle};
pub use toggle::StatusToggle;
