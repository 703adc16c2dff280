//! Optimistic "posted" toggle for gallery items

use std::sync::Arc;

use api::Backend;
use tracing::{info, warn};

use crate::gallery::GalleryView;

/// Flips the posted flag of gallery items
///
/// The local view changes first; the backend is told afterwards and the old
/// value comes back if it refuses. Failures are only logged.
pub struct StatusToggle {
    backend: Arc<dyn Backend>,
    view: GalleryView,
}

impl StatusToggle {
    pub fn new(backend: Arc<dyn Backend>, view: GalleryView) -> Self {
        Self { backend, view }
    }

    /// Negate the posted flag of `item_id`
    ///
    /// Returns the value the item holds afterwards, or `None` if the item is
    /// not in the gallery.
    pub async fn toggle(&self, token: &str, item_id: &str) -> Option<bool> {
        let previous = self.view.get(item_id).await?.is_posted;
        let desired = !previous;
        self.view.set_posted(item_id, desired).await?;

        match self.backend.set_posted(token, item_id, desired).await {
            Ok(()) => {
                info!("Marked {} as posted={}", item_id, desired);
                Some(desired)
            }
            Err(e) => {
                warn!("Failed to update posted flag of {}: {}", item_id, e);
                self.view.set_posted(item_id, previous).await;
                Some(previous)
            }
        }
    }
}
