//! Video downloads
//!
//! [`Downloader`] streams a gallery item to disk and records its id in the
//! [`DownloadRegistry`], which survives restarts under the
//! `downloaded_videos` storage key.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{Context, Result, bail};
use api::models::GalleryItem;
use common::{
    error::{StorageError, StorageResult},
    storage::{DOWNLOADED_KEY, KeyValueStore, load_json, save_json},
};
use futures_util::StreamExt;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, info};

/// Ids of videos already downloaded on this machine
pub struct DownloadRegistry {
    storage: Arc<dyn KeyValueStore>,
    ids: Mutex<BTreeSet<String>>,
}

impl DownloadRegistry {
    /// Load the registry; an unreadable entry starts an empty one
    pub fn load(storage: Arc<dyn KeyValueStore>) -> StorageResult<Self> {
        let ids = match load_json::<BTreeSet<String>>(storage.as_ref(), DOWNLOADED_KEY) {
            Ok(ids) => ids.unwrap_or_default(),
            Err(StorageError::Serialization(e)) => {
                debug!("Ignoring unreadable download registry: {}", e);
                BTreeSet::new()
            }
            Err(e) => return Err(e),
        };
        Ok(Self {
            storage,
            ids: Mutex::new(ids),
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.lock().map(|ids| ids.contains(id)).unwrap_or(false)
    }

    /// Record `id`; returns false if it was already recorded
    pub fn mark(&self, id: &str) -> StorageResult<bool> {
        let mut ids = self.ids.lock().map_err(|_| StorageError::Poisoned)?;
        if !ids.insert(id.to_string()) {
            return Ok(false);
        }
        save_json(self.storage.as_ref(), DOWNLOADED_KEY, &*ids)?;
        Ok(true)
    }

    pub fn ids(&self) -> Vec<String> {
        self.ids
            .lock()
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Turn a gallery item name into a safe file name
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_matches('.').trim();
    if cleaned.is_empty() {
        "video".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Streams gallery videos to disk
pub struct Downloader {
    client: reqwest::Client,
    registry: Arc<DownloadRegistry>,
}

impl Downloader {
    pub fn new(registry: Arc<DownloadRegistry>, connect_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .connect_timeout(connect_timeout)
            .build()
            .context("Failed to build download client")?;
        Ok(Self { client, registry })
    }

    pub fn registry(&self) -> &DownloadRegistry {
        &self.registry
    }

    /// Download `item` into `dir` and record it
    ///
    /// The body is written to a `.part` file first and renamed once complete.
    pub async fn download(&self, item: &GalleryItem, dir: &Path) -> Result<PathBuf> {
        if item.download_url.trim().is_empty() {
            bail!("Video {} has no download link", item.id);
        }

        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let file_name = sanitize_file_name(&item.name);
        let target = dir.join(&file_name);
        let partial = dir.join(format!("{file_name}.part"));

        let response = self
            .client
            .get(&item.download_url)
            .send()
            .await
            .with_context(|| format!("Failed to request {}", item.download_url))?;
        if !response.status().is_success() {
            bail!("Download of {} failed with HTTP status {}", item.id, response.status());
        }

        let written = match stream_to_file(response, &partial, &target).await {
            Ok(written) => written,
            Err(e) => {
                if let Err(cleanup) = fs::remove_file(&partial).await {
                    debug!("Could not remove {}: {}", partial.display(), cleanup);
                }
                return Err(e);
            }
        };
        self.registry.mark(&item.id)?;

        info!("Downloaded {} ({} bytes) to {}", item.id, written, target.display());
        Ok(target)
    }
}

/// Write the body to `partial`, then move it to `target`
async fn stream_to_file(response: reqwest::Response, partial: &Path, target: &Path) -> Result<u64> {
    let mut file = fs::File::create(partial)
        .await
        .with_context(|| format!("Failed to create {}", partial.display()))?;
    let mut written: u64 = 0;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("Download interrupted")?;
        file.write_all(&chunk)
            .await
            .with_context(|| format!("Failed to write {}", partial.display()))?;
        written += chunk.len() as u64;
    }
    file.flush()
        .await
        .with_context(|| format!("Failed to write {}", partial.display()))?;
    drop(file);

    fs::rename(partial, target)
        .await
        .with_context(|| format!("Failed to move download to {}", target.display()))?;
    Ok(written)
}
