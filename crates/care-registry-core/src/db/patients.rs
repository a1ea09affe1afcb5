//! Patient profile database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{write_error, Database, DbError, DbResult};
use crate::models::{Identity, Patient, PatientInput, PatientPatch};

const SELECT_PATIENT: &str = r#"
    SELECT p.id, p.age, p.gender, p.medical_history, u.id, u.username, u.email
    FROM patients p
    JOIN users u ON u.id = p.user_id
"#;

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        age: row.get(1)?,
        gender: row.get(2)?,
        medical_history: row.get(3)?,
        user: Identity {
            id: row.get(4)?,
            username: row.get(5)?,
            email: row.get(6)?,
        },
    })
}

impl Database {
    /// Create the patient profile for `owner`. Fails on negative age
    /// and when the identity already has a patient profile; the check
    /// and insert share one write transaction.
    pub fn create_patient(&self, owner: &Identity, input: PatientInput) -> DbResult<Patient> {
        let fields = input.validate()?;

        let conflict = || format!("User '{}' already has a patient profile.", owner.username);
        let tx = self.write_transaction()?;
        if self.get_patient_for_user(&owner.id)?.is_some() {
            return Err(DbError::Conflict(conflict()));
        }

        let patient = Patient::new(owner.clone(), fields);
        self.conn
            .execute(
                r#"
                INSERT INTO patients (id, user_id, age, gender, medical_history)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    patient.id,
                    owner.id,
                    patient.age,
                    patient.gender,
                    patient.medical_history,
                ],
            )
            .map_err(|e| write_error(e, conflict))?;
        tx.commit()?;

        tracing::info!(patient_id = %patient.id, user_id = %owner.id, "patient created");
        Ok(patient)
    }

    /// Get a patient by ID, regardless of owner.
    pub fn get_patient(&self, id: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("{SELECT_PATIENT} WHERE p.id = ?"),
                [id],
                patient_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get the patient profile owned by a user, if any.
    pub fn get_patient_for_user(&self, user_id: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("{SELECT_PATIENT} WHERE p.user_id = ?"),
                [user_id],
                patient_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List the patients owned by a user.
    pub fn list_patients_for_user(&self, user_id: &str) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_PATIENT} WHERE p.user_id = ? ORDER BY p.created_at, p.rowid"
        ))?;
        let rows = stmt.query_map([user_id], patient_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Update a patient. Absent patch fields keep their current value.
    pub fn update_patient(&self, id: &str, patch: PatientPatch) -> DbResult<Patient> {
        let mut patient = self
            .get_patient(id)?
            .ok_or_else(|| DbError::NotFound(format!("patient {}", id)))?;
        patient.apply(patch)?;

        self.conn.execute(
            r#"
            UPDATE patients SET
                age = ?2,
                gender = ?3,
                medical_history = ?4,
                updated_at = datetime('now')
            WHERE id = ?1
            "#,
            params![
                patient.id,
                patient.age,
                patient.gender,
                patient.medical_history,
            ],
        )?;
        Ok(patient)
    }

    /// Delete a patient. Assignments referencing it are removed too.
    pub fn delete_patient(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM patients WHERE id = ?", [id])?;
        if rows_affected > 0 {
            tracing::info!(patient_id = %id, "patient deleted");
        }
        Ok(rows_affected > 0)
    }
}
