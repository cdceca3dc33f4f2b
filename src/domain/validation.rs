//! Field-level validation shared by the application services.

use crate::domain::error::DomainError;

pub const DEFAULT_ITEM_IMAGE_URL: &str = "https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcTSAWzLq6mBWSybJWDe2UNkQ8_9BI2Y1PAu5g&s";

/// Trim a required text field, rejecting blanks with the given message.
pub fn required_text(value: &str, message: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(message));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field, collapsing blanks to `None`.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// Accepts an empty value (stored as `None`) or a plausible address.
pub fn optional_email(value: Option<String>) -> Result<Option<String>, DomainError> {
    match optional_text(value) {
        None => Ok(None),
        Some(email) if is_valid_email(&email) => Ok(Some(email.to_lowercase())),
        Some(_) => Err(DomainError::validation("Email inválido")),
    }
}

pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}

/// Validate an inventory image URL, substituting the placeholder when absent.
pub fn item_image_url(value: Option<String>) -> Result<String, DomainError> {
    let Some(candidate) = optional_text(value) else {
        return Ok(DEFAULT_ITEM_IMAGE_URL.to_string());
    };
    if candidate.starts_with("http://") || candidate.starts_with("https://") {
        Ok(candidate)
    } else {
        Err(DomainError::validation(
            "La URL de la imagen debe comenzar con http:// o https://",
        ))
    }
}
