//! Request and response payloads exchanged with the backend

pub mod auth;
pub mod media;
pub mod video;

pub use auth::{AuthResponse, LoginRequest, RegisterRequest, RegisterResponse, UserProfile};
pub use media::{GalleryItem, GalleryResponse, HighlightsRequest, HighlightsResponse, TogglePostedRequest};
pub use video::{CreateVideoRequest, CreateVideoResponse, TriggerRequest, VideoMethod, VideoRequest};

use serde::{Deserialize, Deserializer, de};

/// Accept a JSON string or number and keep it as a string
///
/// Identifiers come back as integers from some endpoints and as strings
/// from others. `null` reads as an empty string.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(value)) => value,
        Some(Raw::Int(value)) => value.to_string(),
        Some(Raw::Float(value)) => value.to_string(),
        None => String::new(),
    })
}

/// Accept a JSON number or a numeric string as `u64`, defaulting to zero
pub(crate) fn u64_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Text(String),
        Missing(()),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(value) => Ok(value),
        Raw::Text(value) if value.trim().is_empty() => Ok(0),
        Raw::Text(value) => value.trim().parse().map_err(de::Error::custom),
        Raw::Missing(()) => Ok(0),
    }
}
