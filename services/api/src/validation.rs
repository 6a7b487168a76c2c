//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::error::ValidationErrors;
use crate::models::{RegisterRequest, UpdateProfileRequest};

/// Validate display name
pub fn validate_name(name: &str) -> Result<(), String> {
    let name = name.trim();

    if name.is_empty() {
        return Err("The name field is required.".to_string());
    }

    if name.chars().count() > 255 {
        return Err("The name may not be greater than 255 characters.".to_string());
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("The email field is required.".to_string());
    }

    if email.len() > 254 {
        return Err("The email may not be greater than 254 characters.".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("The email must be a valid email address.".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("The password field is required.".to_string());
    }

    if password.chars().count() < 8 {
        return Err("The password must be at least 8 characters.".to_string());
    }

    if password.len() > 128 {
        return Err("The password may not be greater than 128 characters.".to_string());
    }

    Ok(())
}

/// Lower-cased, trimmed form under which emails are stored and compared
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate a registration payload
pub fn validate_registration(request: &RegisterRequest) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.check("name", validate_name(&request.name));
    errors.check("email", validate_email(&normalize_email(&request.email)));
    errors.check("password", validate_password(&request.password));

    if !request.password.is_empty() && request.password != request.password_confirmation {
        errors.add("password", "The password confirmation does not match.");
    }

    errors
}

/// Validate a profile update payload
pub fn validate_profile_update(request: &UpdateProfileRequest) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.check("name", validate_name(&request.name));
    errors.check("email", validate_email(&normalize_email(&request.email)));

    if let Some(new_password) = request.new_password.as_deref() {
        errors.check("new_password", validate_password(new_password));
        if request.password.as_deref().unwrap_or_default().is_empty() {
            errors.add(
                "password",
                "The current password is required to set a new password.",
            );
        }
    }

    errors
}
