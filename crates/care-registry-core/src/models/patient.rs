//! Patient profile models.

use serde::{Deserialize, Serialize};

use super::identity::Identity;
use super::validation::{require_non_negative, require_text, trim_owned, FieldError};

const GENDER_MAX_CHARS: usize = 10;

/// A patient profile, owned one-to-one by an identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub id: String,
    /// Owning identity (read-only once created)
    pub user: Identity,
    pub age: u32,
    pub gender: String,
    /// Free-text medical history
    pub medical_history: String,
}

/// Client-supplied patient fields. `age` is signed so that negative
/// values reach validation instead of failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientInput {
    pub age: i64,
    pub gender: String,
    pub medical_history: String,
}

/// Partial patient update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatientPatch {
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub medical_history: Option<String>,
}

/// Field values that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidPatientFields {
    pub age: u32,
    pub gender: String,
    pub medical_history: String,
}

impl PatientInput {
    /// Trim and check the fields, returning the values to store.
    pub fn validate(self) -> Result<ValidPatientFields, FieldError> {
        let age = require_non_negative("age", self.age)?;
        let gender = trim_owned(self.gender);
        let medical_history = trim_owned(self.medical_history);
        require_text("gender", &gender, Some(GENDER_MAX_CHARS))?;
        require_text("medical_history", &medical_history, None)?;
        Ok(ValidPatientFields {
            age,
            gender,
            medical_history,
        })
    }
}

impl From<PatientInput> for PatientPatch {
    fn from(input: PatientInput) -> Self {
        Self {
            age: Some(input.age),
            gender: Some(input.gender),
            medical_history: Some(input.medical_history),
        }
    }
}

impl Patient {
    /// Build a new patient for `user` from validated fields.
    pub fn new(user: Identity, fields: ValidPatientFields) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user,
            age: fields.age,
            gender: fields.gender,
            medical_history: fields.medical_history,
        }
    }

    /// Apply a patch, re-validating the resulting field set.
    pub fn apply(&mut self, patch: PatientPatch) -> Result<(), FieldError> {
        let merged = PatientInput {
            age: patch.age.unwrap_or(i64::from(self.age)),
            gender: patch.gender.unwrap_or_else(|| self.gender.clone()),
            medical_history: patch
                .medical_history
                .unwrap_or_else(|| self.medical_history.clone()),
        }
        .validate()?;
        self.age = merged.age;
        self.gender = merged.gender;
        self.medical_history = merged.medical_history;
        Ok(())
    }
}
