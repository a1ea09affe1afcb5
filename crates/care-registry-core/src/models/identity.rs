//! Identity models.

use serde::{Deserialize, Serialize};

use super::validation::{require_text, trim_owned, FieldError};

const USERNAME_MAX_CHARS: usize = 150;
const EMAIL_MAX_CHARS: usize = 254;

/// An authenticated principal. Profiles hang off exactly one identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl Identity {
    /// Create a new identity with a fresh ID. Username and email are
    /// trimmed.
    pub fn new(username: String, email: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username: trim_owned(username),
            email: trim_owned(email),
        }
    }

    /// Check username and email before registration.
    pub fn validate(&self) -> Result<(), FieldError> {
        require_text("username", &self.username, Some(USERNAME_MAX_CHARS))?;
        if self.email.chars().count() > EMAIL_MAX_CHARS {
            return Err(FieldError::new("email", "Email address is too long."));
        }
        if !self.email.is_empty() && !self.email.contains('@') {
            return Err(FieldError::new("email", "Enter a valid email address."));
        }
        Ok(())
    }
}

/// A freshly issued bearer credential. The plain token is only ever
/// returned here; the store keeps its digest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IssuedToken {
    pub identity: Identity,
    pub token: String,
}
