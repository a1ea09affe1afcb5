//! Access layer: maps an authenticated caller and a request onto the
//! profile and assignment stores.
//!
//! - Every operation requires a caller; `None` is rejected before the
//!   database is touched.
//! - Doctor and patient records are always attributed to the caller.
//! - Patients are visible only to their owner. Doctors and assignments
//!   are visible to any authenticated caller.

use thiserror::Error;

use crate::db::{Database, DbError};
use crate::models::{
    Doctor, DoctorInput, DoctorPatch, Identity, IssuedToken, MappingInput, Patient,
    PatientDoctorMapping, PatientInput, PatientPatch,
};

/// Request-level error taxonomy.
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("Authentication credentials were not provided or are invalid.")]
    Authentication,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(DbError),
}

impl From<DbError> for AccessError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(what) => AccessError::NotFound(what),
            DbError::Conflict(msg) => AccessError::Conflict(msg),
            DbError::Validation(field) => AccessError::Validation(field.to_string()),
            other => AccessError::Storage(other),
        }
    }
}

pub type AccessResult<T> = Result<T, AccessError>;

fn require_caller(caller: Option<&Identity>) -> AccessResult<&Identity> {
    caller.ok_or(AccessError::Authentication)
}

/// Ownership-aware front door to the stores.
pub struct AccessLayer<'a> {
    db: &'a Database,
}

impl<'a> AccessLayer<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// Register a new identity and hand back its first bearer token.
    pub fn register(&self, username: String, email: String) -> AccessResult<IssuedToken> {
        Ok(self.db.register_identity(username, email)?)
    }

    /// Resolve a bearer token to the calling identity.
    pub fn authenticate(&self, token: Option<&str>) -> AccessResult<Identity> {
        let token = token.ok_or(AccessError::Authentication)?;
        match self.db.authenticate_token(token)? {
            Some(identity) => Ok(identity),
            None => {
                tracing::warn!("rejected unknown bearer token");
                Err(AccessError::Authentication)
            }
        }
    }

    /// Revoke one of the caller's own tokens. Other identities' tokens
    /// are treated as invalid credentials.
    pub fn revoke_token(&self, caller: Option<&Identity>, token: &str) -> AccessResult<()> {
        let caller = require_caller(caller)?;
        match self.db.authenticate_token(token)? {
            Some(owner) if owner.id == caller.id => {
                self.db.revoke_token(token)?;
                tracing::info!(user_id = %caller.id, "token revoked");
                Ok(())
            }
            _ => Err(AccessError::Authentication),
        }
    }

    // =========================================================================
    // Doctors
    // =========================================================================

    pub fn create_doctor(&self, caller: Option<&Identity>, input: DoctorInput) -> AccessResult<Doctor> {
        let caller = require_caller(caller)?;
        Ok(self.db.create_doctor(caller, input)?)
    }

    pub fn list_doctors(&self, caller: Option<&Identity>) -> AccessResult<Vec<Doctor>> {
        require_caller(caller)?;
        tracing::debug!("listing doctors");
        Ok(self.db.list_doctors()?)
    }

    pub fn get_doctor(&self, caller: Option<&Identity>, id: &str) -> AccessResult<Doctor> {
        require_caller(caller)?;
        tracing::debug!(doctor_id = %id, "reading doctor");
        self.db
            .get_doctor(id)?
            .ok_or_else(|| AccessError::NotFound(format!("doctor {}", id)))
    }

    pub fn update_doctor(
        &self,
        caller: Option<&Identity>,
        id: &str,
        patch: DoctorPatch,
    ) -> AccessResult<Doctor> {
        require_caller(caller)?;
        Ok(self.db.update_doctor(id, patch)?)
    }

    pub fn delete_doctor(&self, caller: Option<&Identity>, id: &str) -> AccessResult<()> {
        require_caller(caller)?;
        if !self.db.delete_doctor(id)? {
            return Err(AccessError::NotFound(format!("doctor {}", id)));
        }
        Ok(())
    }

    // =========================================================================
    // Patients (owner-scoped)
    // =========================================================================

    pub fn create_patient(&self, caller: Option<&Identity>, input: PatientInput) -> AccessResult<Patient> {
        let caller = require_caller(caller)?;
        Ok(self.db.create_patient(caller, input)?)
    }

    /// The caller's own patient records.
    pub fn list_patients(&self, caller: Option<&Identity>) -> AccessResult<Vec<Patient>> {
        let caller = require_caller(caller)?;
        tracing::debug!(user_id = %caller.id, "listing own patients");
        Ok(self.db.list_patients_for_user(&caller.id)?)
    }

    pub fn get_patient(&self, caller: Option<&Identity>, id: &str) -> AccessResult<Patient> {
        let caller = require_caller(caller)?;
        tracing::debug!(patient_id = %id, user_id = %caller.id, "reading patient");
        self.owned_patient(caller, id)
    }

    pub fn update_patient(
        &self,
        caller: Option<&Identity>,
        id: &str,
        patch: PatientPatch,
    ) -> AccessResult<Patient> {
        let caller = require_caller(caller)?;
        let tx = self.db.write_transaction()?;
        self.owned_patient(caller, id)?;
        let patient = self.db.update_patient(id, patch)?;
        tx.commit().map_err(DbError::from)?;
        Ok(patient)
    }

    pub fn delete_patient(&self, caller: Option<&Identity>, id: &str) -> AccessResult<()> {
        let caller = require_caller(caller)?;
        let tx = self.db.write_transaction()?;
        self.owned_patient(caller, id)?;
        self.db.delete_patient(id)?;
        tx.commit().map_err(DbError::from)?;
        Ok(())
    }

    /// Another identity's patient is reported as missing, not forbidden.
    fn owned_patient(&self, caller: &Identity, id: &str) -> AccessResult<Patient> {
        self.db
            .get_patient(id)?
            .filter(|patient| patient.user.id == caller.id)
            .ok_or_else(|| AccessError::NotFound(format!("patient {}", id)))
    }

    // =========================================================================
    // Assignments (unrestricted for authenticated callers)
    // =========================================================================

    pub fn create_mapping(
        &self,
        caller: Option<&Identity>,
        input: MappingInput,
    ) -> AccessResult<PatientDoctorMapping> {
        require_caller(caller)?;
        Ok(self.db.create_mapping(&input.patient_id, &input.doctor_id)?)
    }

    pub fn list_mappings(&self, caller: Option<&Identity>) -> AccessResult<Vec<PatientDoctorMapping>> {
        require_caller(caller)?;
        Ok(self.db.list_mappings()?)
    }

    pub fn get_mapping(&self, caller: Option<&Identity>, id: &str) -> AccessResult<PatientDoctorMapping> {
        require_caller(caller)?;
        self.db
            .get_mapping(id)?
            .ok_or_else(|| AccessError::NotFound(format!("mapping {}", id)))
    }

    pub fn delete_mapping(&self, caller: Option<&Identity>, id: &str) -> AccessResult<()> {
        require_caller(caller)?;
        if !self.db.delete_mapping(id)? {
            return Err(AccessError::NotFound(format!("mapping {}", id)));
        }
        Ok(())
    }

    /// Assignments for any patient id; empty when there are none.
    pub fn list_mappings_for_patient(
        &self,
        caller: Option<&Identity>,
        patient_id: &str,
    ) -> AccessResult<Vec<PatientDoctorMapping>> {
        require_caller(caller)?;
        tracing::debug!(patient_id = %patient_id, "listing assignments for patient");
        Ok(self.db.list_mappings_for_patient(patient_id)?)
    }

    /// Assignments for any doctor id; empty when there are none.
    pub fn list_mappings_for_doctor(
        &self,
        caller: Option<&Identity>,
        doctor_id: &str,
    ) -> AccessResult<Vec<PatientDoctorMapping>> {
        require_caller(caller)?;
        tracing::debug!(doctor_id = %doctor_id, "listing assignments for doctor");
        Ok(self.db.list_mappings_for_doctor(doctor_id)?)
    }
}
