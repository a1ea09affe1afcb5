//! Doctor profile models.

use serde::{Deserialize, Serialize};

use super::identity::Identity;
use super::validation::{require_text, trim_owned, FieldError};

const SPECIALIZATION_MAX_CHARS: usize = 100;
const PHONE_MAX_CHARS: usize = 20;

/// A doctor profile, owned one-to-one by an identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Doctor {
    pub id: String,
    /// Owning identity (read-only once created)
    pub user: Identity,
    /// Medical specialization (e.g., "Cardiology")
    pub specialization: String,
    pub phone: String,
}

/// Client-supplied doctor fields. Ownership is never part of the input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoctorInput {
    pub specialization: String,
    pub phone: String,
}

/// Partial doctor update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DoctorPatch {
    pub specialization: Option<String>,
    pub phone: Option<String>,
}

impl DoctorInput {
    /// Trim and check the fields, returning the values to store.
    pub fn validate(self) -> Result<DoctorInput, FieldError> {
        let specialization = trim_owned(self.specialization);
        let phone = trim_owned(self.phone);
        require_text(
            "specialization",
            &specialization,
            Some(SPECIALIZATION_MAX_CHARS),
        )?;
        require_text("phone", &phone, Some(PHONE_MAX_CHARS))?;
        Ok(DoctorInput {
            specialization,
            phone,
        })
    }
}

impl From<DoctorInput> for DoctorPatch {
    fn from(input: DoctorInput) -> Self {
        Self {
            specialization: Some(input.specialization),
            phone: Some(input.phone),
        }
    }
}

impl Doctor {
    /// Build a new doctor for `user` from validated input.
    pub fn new(user: Identity, input: DoctorInput) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user,
            specialization: input.specialization,
            phone: input.phone,
        }
    }

    /// Apply a patch, re-validating the resulting field set.
    pub fn apply(&mut self, patch: DoctorPatch) -> Result<(), FieldError> {
        let merged = DoctorInput {
            specialization: patch
                .specialization
                .unwrap_or_else(|| self.specialization.clone()),
            phone: patch.phone.unwrap_or_else(|| self.phone.clone()),
        }
        .validate()?;
        self.specialization = merged.specialization;
        self.phone = merged.phone;
        Ok(())
    }
}
