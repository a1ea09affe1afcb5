//! Patient/doctor assignment database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{write_error, Database, DbError, DbResult};
use crate::models::PatientDoctorMapping;

const DUPLICATE_ASSIGNMENT: &str = "This doctor is already assigned to this patient.";

fn mapping_from_row(row: &Row<'_>) -> rusqlite::Result<PatientDoctorMapping> {
    Ok(PatientDoctorMapping {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        doctor_id: row.get(2)?,
        assigned_at: row.get(3)?,
    })
}

impl Database {
    /// Assign a doctor to a patient.
    ///
    /// Both profiles must exist and the pair must not already be
    /// assigned. The lookups and the insert share one IMMEDIATE
    /// transaction; the `UNIQUE (patient_id, doctor_id)` constraint
    /// catches any writer that slips past the pre-check.
    pub fn create_mapping(&self, patient_id: &str, doctor_id: &str) -> DbResult<PatientDoctorMapping> {
        let tx = self.write_transaction()?;

        if self.get_patient(patient_id)?.is_none() {
            return Err(DbError::NotFound(format!("patient {}", patient_id)));
        }
        if self.get_doctor(doctor_id)?.is_none() {
            return Err(DbError::NotFound(format!("doctor {}", doctor_id)));
        }
        if self.mapping_exists(patient_id, doctor_id)? {
            tracing::warn!(patient_id, doctor_id, "duplicate assignment rejected");
            return Err(DbError::Conflict(DUPLICATE_ASSIGNMENT.into()));
        }

        let mapping = PatientDoctorMapping::new(patient_id.to_string(), doctor_id.to_string());
        tx.execute(
            r#"
            INSERT INTO patient_doctor_mappings (id, patient_id, doctor_id, assigned_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                mapping.id,
                mapping.patient_id,
                mapping.doctor_id,
                mapping.assigned_at,
            ],
        )
        .map_err(|e| write_error(e, || DUPLICATE_ASSIGNMENT.into()))?;
        tx.commit()?;

        tracing::info!(mapping_id = %mapping.id, patient_id, doctor_id, "doctor assigned");
        Ok(mapping)
    }

    /// Check whether a (patient, doctor) pair is already assigned.
    pub fn mapping_exists(&self, patient_id: &str, doctor_id: &str) -> DbResult<bool> {
        let exists: bool = self.conn.query_row(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM patient_doctor_mappings
                WHERE patient_id = ?1 AND doctor_id = ?2
            )
            "#,
            params![patient_id, doctor_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Get an assignment by ID.
    pub fn get_mapping(&self, id: &str) -> DbResult<Option<PatientDoctorMapping>> {
        self.conn
            .query_row(
                r#"
                SELECT id, patient_id, doctor_id, assigned_at
                FROM patient_doctor_mappings
                WHERE id = ?
                "#,
                [id],
                mapping_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all assignments, oldest first.
    pub fn list_mappings(&self) -> DbResult<Vec<PatientDoctorMapping>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, patient_id, doctor_id, assigned_at
            FROM patient_doctor_mappings
            ORDER BY assigned_at, rowid
            "#,
        )?;
        let rows = stmt.query_map([], mapping_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// List the assignments of one patient. Unknown and unassigned
    /// patients both yield an empty list.
    pub fn list_mappings_for_patient(&self, patient_id: &str) -> DbResult<Vec<PatientDoctorMapping>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, patient_id, doctor_id, assigned_at
            FROM patient_doctor_mappings
            WHERE patient_id = ?
            ORDER BY assigned_at, rowid
            "#,
        )?;
        let rows = stmt.query_map([patient_id], mapping_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// List the assignments of one doctor.
    pub fn list_mappings_for_doctor(&self, doctor_id: &str) -> DbResult<Vec<PatientDoctorMapping>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, patient_id, doctor_id, assigned_at
            FROM patient_doctor_mappings
            WHERE doctor_id = ?
            ORDER BY assigned_at, rowid
            "#,
        )?;
        let rows = stmt.query_map([doctor_id], mapping_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete an assignment.
    pub fn delete_mapping(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM patient_doctor_mappings WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}
