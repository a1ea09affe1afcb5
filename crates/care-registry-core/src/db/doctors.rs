//! Doctor profile database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{write_error, Database, DbError, DbResult};
use crate::models::{Doctor, DoctorInput, DoctorPatch, Identity};

const SELECT_DOCTOR: &str = r#"
    SELECT d.id, d.specialization, d.phone, u.id, u.username, u.email
    FROM doctors d
    JOIN users u ON u.id = d.user_id
"#;

fn doctor_from_row(row: &Row<'_>) -> rusqlite::Result<Doctor> {
    Ok(Doctor {
        id: row.get(0)?,
        specialization: row.get(1)?,
        phone: row.get(2)?,
        user: Identity {
            id: row.get(3)?,
            username: row.get(4)?,
            email: row.get(5)?,
        },
    })
}

impl Database {
    /// Create the doctor profile for `owner`. An identity holds at
    /// most one doctor profile; the check and insert share one write
    /// transaction.
    pub fn create_doctor(&self, owner: &Identity, input: DoctorInput) -> DbResult<Doctor> {
        let input = input.validate()?;

        let conflict = || format!("User '{}' already has a doctor profile.", owner.username);
        let tx = self.write_transaction()?;
        if self.get_doctor_for_user(&owner.id)?.is_some() {
            return Err(DbError::Conflict(conflict()));
        }

        let doctor = Doctor::new(owner.clone(), input);
        self.conn
            .execute(
                r#"
                INSERT INTO doctors (id, user_id, specialization, phone)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![doctor.id, owner.id, doctor.specialization, doctor.phone],
            )
            .map_err(|e| write_error(e, conflict))?;
        tx.commit()?;

        tracing::info!(doctor_id = %doctor.id, user_id = %owner.id, "doctor created");
        Ok(doctor)
    }

    /// Get a doctor by ID.
    pub fn get_doctor(&self, id: &str) -> DbResult<Option<Doctor>> {
        self.conn
            .query_row(
                &format!("{SELECT_DOCTOR} WHERE d.id = ?"),
                [id],
                doctor_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get the doctor profile owned by a user, if any.
    pub fn get_doctor_for_user(&self, user_id: &str) -> DbResult<Option<Doctor>> {
        self.conn
            .query_row(
                &format!("{SELECT_DOCTOR} WHERE d.user_id = ?"),
                [user_id],
                doctor_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all doctors.
    pub fn list_doctors(&self) -> DbResult<Vec<Doctor>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_DOCTOR} ORDER BY d.created_at, d.rowid"))?;
        let rows = stmt.query_map([], doctor_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Update a doctor. Absent patch fields keep their current value.
    pub fn update_doctor(&self, id: &str, patch: DoctorPatch) -> DbResult<Doctor> {
        let mut doctor = self
            .get_doctor(id)?
            .ok_or_else(|| DbError::NotFound(format!("doctor {}", id)))?;
        doctor.apply(patch)?;

        self.conn.execute(
            r#"
            UPDATE doctors SET
                specialization = ?2,
                phone = ?3,
                updated_at = datetime('now')
            WHERE id = ?1
            "#,
            params![doctor.id, doctor.specialization, doctor.phone],
        )?;
        Ok(doctor)
    }

    /// Delete a doctor. Assignments referencing it are removed too.
    pub fn delete_doctor(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM doctors WHERE id = ?", [id])?;
        if rows_affected > 0 {
            tracing::info!(doctor_id = %id, "doctor deleted");
        }
        Ok(rows_affected > 0)
    }
}
