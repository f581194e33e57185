//! Field checks shared by the request types.

use crate::DomainError;

/// Requires `value` to be non-blank and at most `max` characters.
pub(crate) fn require_text(field: &str, value: &str, max: usize) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    if value.chars().count() > max {
        return Err(DomainError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// Like [`require_text`] for optional fields of a partial update.
pub(crate) fn optional_text(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> Result<(), DomainError> {
    match value {
        Some(value) => require_text(field, value, max),
        None => Ok(()),
    }
}

pub(crate) fn require_email(email: &str) -> Result<(), DomainError> {
    require_text("email", email, 100)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(DomainError::validation("email is not a valid address")),
    }
}
