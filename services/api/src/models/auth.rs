//! Authentication payloads

use serde::{Deserialize, Serialize};

use super::string_or_number;

/// Body of `POST /login`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /register`
///
/// The optional fields only apply to some roles and are omitted when unset.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RegisterRequest {
    pub usuario: String,
    pub email: String,
    pub password: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artistic_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub musical_genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed_artists_count: Option<u32>,
}

/// User profile as returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    /// Empty when the backend sends no id
    #[serde(deserialize_with = "string_or_number", default)]
    pub id: String,
    #[serde(alias = "usuario", alias = "username", alias = "display_name", default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Response of `POST /login`
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Response of `POST /register`; some deployments do not sign the user in
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterResponse {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
}
