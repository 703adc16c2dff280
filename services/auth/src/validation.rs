//! Input validation utilities
//!
//! These checks run before any request is sent, so obviously broken forms
//! never reach the backend.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{RegisterData, Role};

const MIN_PASSWORD_LEN: usize = 6;

/// Validate display name
pub fn validate_name(name: &str) -> Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Name is required".to_string());
    }

    if name.chars().count() > 64 {
        return Err("Name must be at most 64 characters long".to_string());
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        ));
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate login input; only presence is checked here
pub fn validate_login(email: &str, password: &str) -> Result<(), String> {
    if email.trim().is_empty() {
        return Err("Email is required".to_string());
    }
    if password.is_empty() {
        return Err("Password is required".to_string());
    }
    Ok(())
}

/// Validate a registration form, including the role-specific fields
pub fn validate_registration(data: &RegisterData) -> Result<(), String> {
    validate_name(&data.name)?;
    validate_email(data.email.trim())?;
    validate_password(&data.password)?;

    match data.role {
        Role::Artist => {
            if data.company_name.is_some() || data.managed_artists_count.is_some() {
                return Err("Company fields only apply to managers".to_string());
            }
        }
        Role::Manager => {
            if data.artistic_name.is_some() || data.musical_genre.is_some() {
                return Err("Artistic fields only apply to artists".to_string());
            }
        }
    }

    Ok(())
}
