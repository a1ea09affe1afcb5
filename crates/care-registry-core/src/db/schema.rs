//! SQLite schema definition.

/// Complete database schema for the care registry.
pub const SCHEMA: &str = r#"
-- Enable foreign keys (required for ON DELETE CASCADE)
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Identities
-- ============================================================================

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Bearer tokens, stored as SHA-256 hex digests
CREATE TABLE IF NOT EXISTS api_tokens (
    token_hash TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_tokens_user ON api_tokens(user_id);

-- ============================================================================
-- Profiles (one per identity)
-- ============================================================================

CREATE TABLE IF NOT EXISTS doctors (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    specialization TEXT NOT NULL CHECK (length(specialization) <= 100),
    phone TEXT NOT NULL CHECK (length(phone) <= 20),
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    age INTEGER NOT NULL CHECK (age >= 0),
    gender TEXT NOT NULL CHECK (length(gender) <= 10),
    medical_history TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Patient/Doctor Assignments
-- ============================================================================

CREATE TABLE IF NOT EXISTS patient_doctor_mappings (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
    doctor_id TEXT NOT NULL REFERENCES doctors(id) ON DELETE CASCADE,
    assigned_at TEXT NOT NULL,
    -- Storage-level duplicate guard; holds under concurrent writers
    UNIQUE (patient_id, doctor_id)
);

CREATE INDEX IF NOT EXISTS idx_mappings_doctor ON patient_doctor_mappings(doctor_id);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO users (id, username) VALUES ('u1', 'alice'), ('u2', 'bob');
            INSERT INTO patients (id, user_id, age, gender, medical_history)
                VALUES ('p1', 'u1', 25, 'female', 'Asthma');
            INSERT INTO doctors (id, user_id, specialization, phone)
                VALUES ('d1', 'u2', 'Dermatology', '9876543210');
            "#,
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_schema_idempotent() {
        let conn = setup();
        assert!(conn.execute_batch(SCHEMA).is_ok());
    }

    #[test]
    fn test_pair_unique_constraint() {
        let conn = setup();
        conn.execute(
            "INSERT INTO patient_doctor_mappings (id, patient_id, doctor_id, assigned_at) VALUES ('m1', 'p1', 'd1', 'now')",
            [],
        )
        .unwrap();

        // Same pair under a different ID must still fail
        let result = conn.execute(
            "INSERT INTO patient_doctor_mappings (id, patient_id, doctor_id, assigned_at) VALUES ('m2', 'p1', 'd1', 'now')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_one_profile_per_user() {
        let conn = setup();
        let result = conn.execute(
            "INSERT INTO patients (id, user_id, age, gender, medical_history) VALUES ('p2', 'u1', 30, 'male', 'None')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_age_check() {
        let conn = setup();
        let result = conn.execute(
            "INSERT INTO patients (id, user_id, age, gender, medical_history) VALUES ('p2', 'u2', -3, 'male', 'None')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_user_delete_cascades() {
        let conn = setup();
        conn.execute(
            "INSERT INTO patient_doctor_mappings (id, patient_id, doctor_id, assigned_at) VALUES ('m1', 'p1', 'd1', 'now')",
            [],
        )
        .unwrap();

        conn.execute("DELETE FROM users WHERE id = 'u1'", []).unwrap();

        let patients: i64 = conn
            .query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))
            .unwrap();
        let mappings: i64 = conn
            .query_row("SELECT COUNT(*) FROM patient_doctor_mappings", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(patients, 0);
        assert_eq!(mappings, 0);
    }
}
