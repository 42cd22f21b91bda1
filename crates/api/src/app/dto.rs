//! Request DTOs and field validation.
//!
//! Validation failures are 422s with a plain reason string; the checks
//! mirror the storage constraints (varchar(255), one email per user).

use serde::{Deserialize, Serialize};

const MAX_FIELD_CHARS: usize = 255;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

/// Body of `POST /`; echoed back inside the success envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct PersonRequest {
    pub name: String,
}

pub fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name must not be empty".to_string());
    }
    if name.chars().count() > MAX_FIELD_CHARS {
        return Err(format!("name must be at most {MAX_FIELD_CHARS} characters"));
    }
    Ok(())
}

/// Deliberately loose shape check: one `@`, a non-empty local part, and a
/// dotted domain. Anything stricter belongs to the mail provider.
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.chars().count() > MAX_FIELD_CHARS {
        return Err(format!("email must be at most {MAX_FIELD_CHARS} characters"));
    }
    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return Err("email must be a valid email address".to_string()),
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err("email must be a valid email address".to_string());
    }
    Ok(())
}

pub fn validate_new_user(request: &CreateUserRequest) -> Result<(), String> {
    validate_name(&request.name)?;
    validate_email(&request.email)
}

pub fn validate_user_patch(request: &UpdateUserRequest) -> Result<(), String> {
    if let Some(name) = &request.name {
        validate_name(name)?;
    }
    if let Some(email) = &request.email {
        validate_email(email)?;
    }
    Ok(())
}
