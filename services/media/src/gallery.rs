//! Shared local copy of the gallery

use std::sync::Arc;

use api::models::GalleryItem;
use tokio::sync::RwLock;

/// Gallery items as last fetched, plus local "posted" edits
#[derive(Clone, Default)]
pub struct GalleryView {
    items: Arc<RwLock<Vec<GalleryItem>>>,
}

impl GalleryView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every item with a fresh fetch
    pub async fn replace(&self, items: Vec<GalleryItem>) {
        *self.items.write().await = items;
    }

    pub async fn clear(&self) {
        self.items.write().await.clear();
    }

    pub async fn snapshot(&self) -> Vec<GalleryItem> {
        self.items.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<GalleryItem> {
        self.items.read().await.iter().find(|item| item.id == id).cloned()
    }

    /// Set the posted flag of item `id`; returns the previous value, or
    /// `None` if no such item is present
    pub async fn set_posted(&self, id: &str, is_posted: bool) -> Option<bool> {
        let mut items = self.items.write().await;
        let item = items.iter_mut().find(|item| item.id == id)?;
        Some(std::mem::replace(&mut item.is_posted, is_posted))
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}
