//! Video dashboard client
//!
//! Ties the session store, the request submitter and the gallery together
//! behind [`Dashboard`]. The `dashboard` binary is a thin command-line front
//! end over it.

pub mod app;
pub mod cooldown;
pub mod highlights;
pub mod images;
pub mod submitter;

pub use app::Dashboard;
pub use cooldown::{Cooldown, CooldownCounter};
pub use images::ImageUpload;
pub use submitter::{
    Draft, PhraseMode, Rejection, SubmitOutcome, SubmitStatus, Submitter, SubmitterSettings,
};
