//! YouTube highlight extraction

use std::sync::OnceLock;

use api::{ApiError, ApiResult, Backend};
use auth::Session;
use regex::Regex;
use tracing::info;

/// Check that `url` points at a single YouTube video
pub fn validate_youtube_url(url: &str) -> Result<(), String> {
    let url = url.trim();
    if url.is_empty() {
        return Err("YouTube URL is required".to_string());
    }

    static YOUTUBE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = YOUTUBE_REGEX.get_or_init(|| {
        Regex::new(
            r"^https?://(?:(?:www|m)\.)?(?:youtube\.com/(?:watch\?(?:[^#\s]*&)?v=|shorts/)|youtu\.be/)[A-Za-z0-9_-]{6,}",
        )
        .expect("Failed to compile YouTube URL regex")
    });

    if !regex.is_match(url) {
        return Err("Enter a valid YouTube video URL".to_string());
    }

    Ok(())
}

/// Ask the backend to cut highlights out of a YouTube video
///
/// Returns the paths of the generated clips. An invalid URL is rejected
/// without any request.
pub async fn request_highlights(
    backend: &dyn Backend,
    session: &Session,
    url: &str,
) -> ApiResult<Vec<String>> {
    validate_youtube_url(url).map_err(ApiError::Validation)?;

    let highlights = backend.youtube_highlights(session.token(), url.trim()).await?;
    info!("Received {} highlights", highlights.len());
    Ok(highlights)
}
