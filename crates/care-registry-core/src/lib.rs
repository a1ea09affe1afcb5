//! Care Registry Core Library
//!
//! Doctor and patient profiles tied one-to-one to user identities, and
//! the many-to-many assignment of doctors to patients.
//!
//! # Architecture
//!
//! ```text
//!   Caller (bearer token)
//!          │
//!          ▼
//!   Identity store ──► Identity
//!          │
//!          ▼
//!   ┌──────────────────────────────┐
//!   │         Access layer         │   owner scoping, server-assigned
//!   └──────┬───────────────┬───────┘   ownership, auth required
//!          │               │
//!          ▼               ▼
//!   Profile store    Assignment store
//!   (doctors,        (UNIQUE patient/doctor pair,
//!    patients)        cascade on profile delete)
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite storage with foreign-key cascades and uniqueness constraints
//! - [`models`]: Domain types (Identity, Doctor, Patient, PatientDoctorMapping)
//! - [`access`]: Authenticated, ownership-aware operations over the stores

pub mod access;
pub mod db;
pub mod models;

// Re-export commonly used types
pub use access::{AccessError, AccessLayer, AccessResult};
pub use db::Database;
pub use models::{
    Doctor, DoctorInput, DoctorPatch, Identity, IssuedToken, MappingInput, Patient,
    PatientDoctorMapping, PatientInput, PatientPatch,
};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum CareRegistryError {
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    ConflictError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<AccessError> for CareRegistryError {
    fn from(e: AccessError) -> Self {
        match e {
            AccessError::Authentication => CareRegistryError::AuthenticationError(e.to_string()),
            AccessError::Validation(msg) => CareRegistryError::ValidationError(msg),
            AccessError::Conflict(msg) => CareRegistryError::ConflictError(msg),
            AccessError::NotFound(what) => CareRegistryError::NotFound(what),
            AccessError::Storage(e) => CareRegistryError::DatabaseError(e.to_string()),
        }
    }
}

impl From<db::DbError> for CareRegistryError {
    fn from(e: db::DbError) -> Self {
        AccessError::from(e).into()
    }
}

impl<T> From<std::sync::PoisonError<T>> for CareRegistryError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        CareRegistryError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_registry(path: String) -> Result<Arc<CareRegistryCore>, CareRegistryError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(CareRegistryCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_registry_in_memory() -> Result<Arc<CareRegistryCore>, CareRegistryError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(CareRegistryCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe registry handle for FFI. Every call that touches
/// profiles or assignments takes the caller's bearer token.
#[derive(uniffi::Object)]
pub struct CareRegistryCore {
    db: Arc<Mutex<Database>>,
}

impl CareRegistryCore {
    /// Authenticate `token`, then run `op` with the resolved caller.
    fn with_caller<T>(
        &self,
        token: Option<String>,
        op: impl FnOnce(&AccessLayer<'_>, &Identity) -> AccessResult<T>,
    ) -> Result<T, CareRegistryError> {
        let db = self.db.lock()?;
        let access = AccessLayer::new(&db);
        let caller = access.authenticate(token.as_deref())?;
        Ok(op(&access, &caller)?)
    }
}

#[uniffi::export]
impl CareRegistryCore {
    // =========================================================================
    // Identity Operations
    // =========================================================================

    /// Register a new identity and return its bearer token.
    pub fn register(
        &self,
        username: String,
        email: String,
    ) -> Result<FfiIssuedToken, CareRegistryError> {
        let db = self.db.lock()?;
        let issued = AccessLayer::new(&db).register(username, email)?;
        Ok(issued.into())
    }

    /// Resolve a token to its identity.
    pub fn whoami(&self, token: Option<String>) -> Result<FfiIdentity, CareRegistryError> {
        self.with_caller(token, |_, caller| Ok(caller.clone().into()))
    }

    /// Revoke the given token. It stops authenticating immediately.
    pub fn logout(&self, token: Option<String>) -> Result<(), CareRegistryError> {
        let revoked = token.clone();
        self.with_caller(token, |access, caller| {
            access.revoke_token(Some(caller), revoked.as_deref().unwrap_or_default())
        })
    }

    // =========================================================================
    // Doctor Operations
    // =========================================================================

    /// Create the caller's doctor profile.
    pub fn create_doctor(
        &self,
        token: Option<String>,
        specialization: String,
        phone: String,
    ) -> Result<FfiDoctor, CareRegistryError> {
        self.with_caller(token, |access, caller| {
            access
                .create_doctor(
                    Some(caller),
                    DoctorInput {
                        specialization,
                        phone,
                    },
                )
                .map(Into::into)
        })
    }

    pub fn list_doctors(&self, token: Option<String>) -> Result<Vec<FfiDoctor>, CareRegistryError> {
        self.with_caller(token, |access, caller| {
            let doctors = access.list_doctors(Some(caller))?;
            Ok(doctors.into_iter().map(|d| d.into()).collect())
        })
    }

    pub fn get_doctor(
        &self,
        token: Option<String>,
        id: String,
    ) -> Result<FfiDoctor, CareRegistryError> {
        self.with_caller(token, |access, caller| {
            access.get_doctor(Some(caller), &id).map(Into::into)
        })
    }

    /// Update a doctor; `None` fields are left unchanged.
    pub fn update_doctor(
        &self,
        token: Option<String>,
        id: String,
        specialization: Option<String>,
        phone: Option<String>,
    ) -> Result<FfiDoctor, CareRegistryError> {
        self.with_caller(token, |access, caller| {
            access
                .update_doctor(
                    Some(caller),
                    &id,
                    DoctorPatch {
                        specialization,
                        phone,
                    },
                )
                .map(Into::into)
        })
    }

    pub fn delete_doctor(&self, token: Option<String>, id: String) -> Result<(), CareRegistryError> {
        self.with_caller(token, |access, caller| access.delete_doctor(Some(caller), &id))
    }

    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Create the caller's patient profile.
    pub fn create_patient(
        &self,
        token: Option<String>,
        age: i64,
        gender: String,
        medical_history: String,
    ) -> Result<FfiPatient, CareRegistryError> {
        self.with_caller(token, |access, caller| {
            access
                .create_patient(
                    Some(caller),
                    PatientInput {
                        age,
                        gender,
                        medical_history,
                    },
                )
                .map(Into::into)
        })
    }

    /// List the caller's own patient records.
    pub fn list_patients(&self, token: Option<String>) -> Result<Vec<FfiPatient>, CareRegistryError> {
        self.with_caller(token, |access, caller| {
            let patients = access.list_patients(Some(caller))?;
            Ok(patients.into_iter().map(|p| p.into()).collect())
        })
    }

    pub fn get_patient(
        &self,
        token: Option<String>,
        id: String,
    ) -> Result<FfiPatient, CareRegistryError> {
        self.with_caller(token, |access, caller| {
            access.get_patient(Some(caller), &id).map(Into::into)
        })
    }

    /// Update the caller's patient; `None` fields are left unchanged.
    pub fn update_patient(
        &self,
        token: Option<String>,
        id: String,
        age: Option<i64>,
        gender: Option<String>,
        medical_history: Option<String>,
    ) -> Result<FfiPatient, CareRegistryError> {
        self.with_caller(token, |access, caller| {
            access
                .update_patient(
                    Some(caller),
                    &id,
                    PatientPatch {
                        age,
                        gender,
                        medical_history,
                    },
                )
                .map(Into::into)
        })
    }

    pub fn delete_patient(&self, token: Option<String>, id: String) -> Result<(), CareRegistryError> {
        self.with_caller(token, |access, caller| access.delete_patient(Some(caller), &id))
    }

    // =========================================================================
    // Assignment Operations
    // =========================================================================

    /// Assign a doctor to a patient.
    pub fn create_mapping(
        &self,
        token: Option<String>,
        patient_id: String,
        doctor_id: String,
    ) -> Result<FfiMapping, CareRegistryError> {
        self.with_caller(token, |access, caller| {
            access
                .create_mapping(
                    Some(caller),
                    MappingInput {
                        patient_id,
                        doctor_id,
                    },
                )
                .map(Into::into)
        })
    }

    pub fn list_mappings(&self, token: Option<String>) -> Result<Vec<FfiMapping>, CareRegistryError> {
        self.with_caller(token, |access, caller| {
            let mappings = access.list_mappings(Some(caller))?;
            Ok(mappings.into_iter().map(|m| m.into()).collect())
        })
    }

    pub fn get_mapping(
        &self,
        token: Option<String>,
        id: String,
    ) -> Result<FfiMapping, CareRegistryError> {
        self.with_caller(token, |access, caller| {
            access.get_mapping(Some(caller), &id).map(Into::into)
        })
    }

    pub fn delete_mapping(&self, token: Option<String>, id: String) -> Result<(), CareRegistryError> {
        self.with_caller(token, |access, caller| access.delete_mapping(Some(caller), &id))
    }

    /// All assignments for a doctor id (empty if none).
    pub fn list_mappings_for_doctor(
        &self,
        token: Option<String>,
        doctor_id: String,
    ) -> Result<Vec<FfiMapping>, CareRegistryError> {
        self.with_caller(token, |access, caller| {
            let mappings = access.list_mappings_for_doctor(Some(caller), &doctor_id)?;
            Ok(mappings.into_iter().map(|m| m.into()).collect())
        })
    }

    /// All assignments for a patient id (empty if none).
    pub fn list_mappings_for_patient(
        &self,
        token: Option<String>,
        patient_id: String,
    ) -> Result<Vec<FfiMapping>, CareRegistryError> {
        self.with_caller(token, |access, caller| {
            let mappings = access.list_mappings_for_patient(Some(caller), &patient_id)?;
            Ok(mappings.into_iter().map(|m| m.into()).collect())
        })
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe identity.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiIdentity {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl From<Identity> for FfiIdentity {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            username: identity.username,
            email: identity.email,
        }
    }
}

/// FFI-safe issued token.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiIssuedToken {
    pub identity: FfiIdentity,
    pub token: String,
}

impl From<IssuedToken> for FfiIssuedToken {
    fn from(issued: IssuedToken) -> Self {
        Self {
            identity: issued.identity.into(),
            token: issued.token,
        }
    }
}

/// FFI-safe doctor.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDoctor {
    pub id: String,
    pub user: FfiIdentity,
    pub specialization: String,
    pub phone: String,
}

impl From<Doctor> for FfiDoctor {
    fn from(doctor: Doctor) -> Self {
        Self {
            id: doctor.id,
            user: doctor.user.into(),
            specialization: doctor.specialization,
            phone: doctor.phone,
        }
    }
}

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: String,
    pub user: FfiIdentity,
    pub age: u32,
    pub gender: String,
    pub medical_history: String,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            user: patient.user.into(),
            age: patient.age,
            gender: patient.gender,
            medical_history: patient.medical_history,
        }
    }
}

/// FFI-safe patient/doctor assignment.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMapping {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub assigned_at: String,
}

impl From<PatientDoctorMapping> for FfiMapping {
    fn from(mapping: PatientDoctorMapping) -> Self {
        Self {
            id: mapping.id,
            patient_id: mapping.patient_id,
            doctor_id: mapping.doctor_id,
            assigned_at: mapping.assigned_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ffi_round_trip_flow() {
        let core = open_registry_in_memory().unwrap();
        let alice = core.register("alice".into(), String::new()).unwrap();
        let bob = core.register("bob".into(), String::new()).unwrap();

        let patient = core
            .create_patient(Some(alice.token.clone()), 25, "female".into(), "Asthma".into())
            .unwrap();
        assert_eq!(patient.user.id, alice.identity.id);

        let doctor = core
            .create_doctor(Some(bob.token.clone()), "Dermatology".into(), "9876543210".into())
            .unwrap();

        let mapping = core
            .create_mapping(Some(bob.token.clone()), patient.id.clone(), doctor.id.clone())
            .unwrap();
        assert_eq!(mapping.patient_id, patient.id);

        let again = core.create_mapping(Some(bob.token), patient.id, doctor.id);
        assert!(matches!(again, Err(CareRegistryError::ConflictError(_))));
    }

    #[test]
    fn test_ffi_logout_and_doctor_listing() {
        let core = open_registry_in_memory().unwrap();
        let alice = core.register("alice".into(), String::new()).unwrap();
        let doctor = core
            .create_doctor(Some(alice.token.clone()), "Cardiology".into(), "1".into())
            .unwrap();
        let patient = core
            .create_patient(Some(alice.token.clone()), 40, "male".into(), "None".into())
            .unwrap();
        core.create_mapping(Some(alice.token.clone()), patient.id, doctor.id.clone())
            .unwrap();

        let mappings = core
            .list_mappings_for_doctor(Some(alice.token.clone()), doctor.id)
            .unwrap();
        assert_eq!(mappings.len(), 1);

        core.logout(Some(alice.token.clone())).unwrap();
        assert!(matches!(
            core.whoami(Some(alice.token)),
            Err(CareRegistryError::AuthenticationError(_))
        ));
    }

    #[test]
    fn test_ffi_requires_token() {
        let core = open_registry_in_memory().unwrap();
        assert!(matches!(
            core.list_doctors(None),
            Err(CareRegistryError::AuthenticationError(_))
        ));
        assert!(matches!(
            core.create_doctor(Some("bogus".into()), "Cardiology".into(), "1".into()),
            Err(CareRegistryError::AuthenticationError(_))
        ));
    }
}
