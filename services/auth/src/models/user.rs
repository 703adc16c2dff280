//! Login and registration input

use super::Role;

/// User login credentials
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Registration form
#[derive(Debug, Clone)]
pub struct RegisterData {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub artistic_name: Option<String>,
    pub musical_genre: Option<String>,
    pub company_name: Option<String>,
    pub managed_artists_count: Option<u32>,
}

impl RegisterData {
    /// A registration with no role-specific fields filled in
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            role,
            artistic_name: None,
            musical_genre: None,
            company_name: None,
            managed_artists_count: None,
        }
    }
}
