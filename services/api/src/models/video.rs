//! Video generation payloads

use serde::{Deserialize, Serialize};

use super::string_or_number;

/// How the phrase for a video is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoMethod {
    /// The workflow picks the phrase
    #[serde(rename = "Automatico")]
    Automatic,
    /// The user typed the phrase
    #[serde(rename = "Manual")]
    Manual,
}

/// Body of `POST /api/video-request`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreateVideoRequest {
    pub metodo: VideoMethod,
    pub frase: Option<String>,
    pub num_images: usize,
}

/// A persisted video request; its status is owned by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoRequest {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "metodo", default)]
    pub method: Option<VideoMethod>,
    #[serde(rename = "frase", default)]
    pub phrase: Option<String>,
    #[serde(rename = "num_images", default)]
    pub image_count: Option<u32>,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "pending".to_string()
}

/// Response of `POST /api/video-request`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateVideoResponse {
    pub request: VideoRequest,
}

/// Body of `POST /api/trigger-n8n`
///
/// `images` holds raw base64 payloads, without the `data:...;base64,` prefix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TriggerRequest {
    pub request_id: String,
    pub user: String,
    pub metodo: VideoMethod,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub frase: Option<String>,
    pub images: Vec<String>,
}
