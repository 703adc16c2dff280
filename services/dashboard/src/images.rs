//! Images attached to a video request

use std::path::Path;

use base64::{Engine, engine::general_purpose::STANDARD};

/// An image selected for upload, kept as a data URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub name: String,
    pub data_url: String,
}

impl ImageUpload {
    pub fn new(name: impl Into<String>, data_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_url: data_url.into(),
        }
    }

    /// Encode raw image bytes as a base64 data URL
    pub fn from_bytes(name: impl Into<String>, mime_type: &str, bytes: &[u8]) -> Self {
        let data_url = format!("data:{mime_type};base64,{}", STANDARD.encode(bytes));
        Self::new(name, data_url)
    }

    /// Read an image file; the MIME type comes from the extension
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self::from_bytes(name, mime_type_for(path), &bytes))
    }

    /// Base64 payload sent to the generation workflow
    ///
    /// Everything up to and including the first comma is dropped; a value
    /// without a comma is returned unchanged.
    pub fn payload(&self) -> &str {
        match self.data_url.split_once(',') {
            Some((_, payload)) => payload,
            None => &self.data_url,
        }
    }
}

fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}
