//! Field validation shared by profile and identity inputs.

use thiserror::Error;

/// A single rejected input field.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{field}: {reason}")]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Strip leading and trailing whitespace. Text fields are stored and
/// length-checked in trimmed form.
pub(crate) fn trim_owned(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}

/// Require a non-blank string of at most `max_chars` characters.
pub(crate) fn require_text(
    field: &'static str,
    value: &str,
    max_chars: Option<usize>,
) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::new(field, "This field may not be blank."));
    }
    if let Some(max) = max_chars {
        if value.chars().count() > max {
            return Err(FieldError::new(
                field,
                format!("Ensure this field has no more than {} characters.", max),
            ));
        }
    }
    Ok(())
}

/// Require a non-negative integer that fits the stored column.
pub(crate) fn require_non_negative(field: &'static str, value: i64) -> Result<u32, FieldError> {
    if value < 0 {
        return Err(FieldError::new(
            field,
            "Ensure this value is greater than or equal to 0.",
        ));
    }
    u32::try_from(value).map_err(|_| FieldError::new(field, "Value is out of range."))
}
