//! Gallery payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use super::{string_or_number, u64_or_string};

/// A generated video stored in cloud storage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(alias = "thumbnail_url", alias = "thumbnailLink", default)]
    pub thumbnail_url: String,
    #[serde(alias = "download_url", alias = "webContentLink", default)]
    pub download_url: String,
    #[serde(alias = "created_at", alias = "createdTime")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "size_bytes", alias = "size", deserialize_with = "u64_or_string", default)]
    pub size_bytes: u64,
    #[serde(alias = "mime_type", default)]
    pub mime_type: Option<String>,
    #[serde(alias = "is_posted", default)]
    pub is_posted: bool,
}

/// Response of `GET /api/gallery`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GalleryResponse {
    #[serde(default, deserialize_with = "skip_malformed")]
    pub videos: Vec<GalleryItem>,
}

/// Decode each entry on its own, dropping the ones that do not parse
fn skip_malformed<'de, D>(deserializer: D) -> Result<Vec<GalleryItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<GalleryItem>(value) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("Skipping malformed gallery item: {}", e);
                None
            }
        })
        .collect())
}

/// Body of `POST /api/gallery/toggle-posted`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TogglePostedRequest {
    pub drive_file_id: String,
    pub is_posted: bool,
}

/// Body of `POST /api/youtube-highlights`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HighlightsRequest {
    pub url: String,
}

/// Response of `POST /api/youtube-highlights`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HighlightsResponse {
    #[serde(default)]
    pub highlights: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
}
