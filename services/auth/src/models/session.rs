//! Session model and related functionality

use api::models::UserProfile;
use serde::{Deserialize, Serialize};

/// Signed-in user as kept in memory
///
/// The bearer token is private so a session can only be built through
/// [`Session::new`], which refuses an empty token.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
    pub role: Option<String>,
    token: String,
}

/// Profile part of a session, as written to durable storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredProfile {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

impl Session {
    /// Build a session; `None` when the token is empty or blank
    pub fn new(profile: StoredProfile, token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return None;
        }
        Some(Self {
            user_id: profile.user_id,
            display_name: profile.display_name,
            email: profile.email,
            role: profile.role,
            token,
        })
    }

    /// Build a session from a login or registration response
    pub fn from_user(user: UserProfile, token: impl Into<String>) -> Option<Self> {
        Self::new(
            StoredProfile {
                user_id: user.id,
                display_name: user.name,
                email: user.email,
                role: user.role,
            },
            token,
        )
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn profile(&self) -> StoredProfile {
        StoredProfile {
            user_id: self.user_id.clone(),
            display_name: self.display_name.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
        }
    }

    /// Identifier sent with generation triggers: user id, then email, then
    /// `"anonymous"`
    pub fn trigger_user(&self) -> String {
        [&self.user_id, &self.email]
            .into_iter()
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
            .unwrap_or("anonymous")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(user_id: &str, email: &str) -> StoredProfile {
        StoredProfile {
            user_id: user_id.to_string(),
            display_name: "Ana".to_string(),
            email: email.to_string(),
            role: None,
        }
    }

    #[test]
    fn test_empty_token_is_rejected() {
        assert!(Session::new(profile("1", "a@b.co"), "").is_none());
        assert!(Session::new(profile("1", "a@b.co"), "   ").is_none());
        assert!(Session::new(profile("1", "a@b.co"), "t").is_some());
    }

    #[test]
    fn test_trigger_user_fallbacks() {
        let session = Session::new(profile("12", "a@b.co"), "t").expect("session");
        assert_eq!(session.trigger_user(), "12");

        let session = Session::new(profile("", "a@b.co"), "t").expect("session");
        assert_eq!(session.trigger_user(), "a@b.co");

        let session = Session::new(profile(" ", ""), "t").expect("session");
        assert_eq!(session.trigger_user(), "anonymous");
    }
}
