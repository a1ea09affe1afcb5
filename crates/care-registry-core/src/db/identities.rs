//! Identity store: user accounts and bearer tokens.

use rusqlite::{params, OptionalExtension};
use sha2::{Digest, Sha256};

use super::{write_error, Database, DbError, DbResult};
use crate::models::{Identity, IssuedToken};

/// Hash a bearer token for storage and lookup.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate an opaque bearer token (256 bits, hex).
fn generate_token() -> String {
    format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

impl Database {
    /// Insert a new identity. Usernames are unique.
    pub fn insert_identity(&self, identity: &Identity) -> DbResult<()> {
        identity.validate()?;
        self.conn
            .execute(
                "INSERT INTO users (id, username, email) VALUES (?1, ?2, ?3)",
                params![identity.id, identity.username, identity.email],
            )
            .map_err(|e| {
                write_error(e, || {
                    format!("A user with username '{}' already exists.", identity.username)
                })
            })?;
        Ok(())
    }

    /// Register an identity and issue its first token in one transaction.
    pub fn register_identity(&self, username: String, email: String) -> DbResult<IssuedToken> {
        let identity = Identity::new(username, email);
        let tx = self.write_transaction()?;
        self.insert_identity(&identity)?;
        let token = self.store_new_token(&identity.id)?;
        tx.commit()?;

        tracing::info!(user_id = %identity.id, username = %identity.username, "identity registered");
        Ok(IssuedToken { identity, token })
    }

    /// Issue an additional token for an existing identity.
    pub fn issue_token(&self, user_id: &str) -> DbResult<String> {
        if self.get_identity(user_id)?.is_none() {
            return Err(DbError::NotFound(format!("user {}", user_id)));
        }
        self.store_new_token(user_id)
    }

    fn store_new_token(&self, user_id: &str) -> DbResult<String> {
        let token = generate_token();
        self.conn.execute(
            "INSERT INTO api_tokens (token_hash, user_id) VALUES (?1, ?2)",
            params![hash_token(&token), user_id],
        )?;
        Ok(token)
    }

    /// Resolve a bearer token to its identity.
    pub fn authenticate_token(&self, token: &str) -> DbResult<Option<Identity>> {
        self.conn
            .query_row(
                r#"
                SELECT u.id, u.username, u.email
                FROM api_tokens t
                JOIN users u ON u.id = t.user_id
                WHERE t.token_hash = ?
                "#,
                [hash_token(token)],
                |row| {
                    Ok(Identity {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        email: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Revoke a single token.
    pub fn revoke_token(&self, token: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "DELETE FROM api_tokens WHERE token_hash = ?",
            [hash_token(token)],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get an identity by ID.
    pub fn get_identity(&self, id: &str) -> DbResult<Option<Identity>> {
        self.conn
            .query_row(
                "SELECT id, username, email FROM users WHERE id = ?",
                [id],
                |row| {
                    Ok(Identity {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        email: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Delete an identity. Its tokens, profiles and their assignments
    /// go with it.
    pub fn delete_identity(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM users WHERE id = ?", [id])?;
        if rows_affected > 0 {
            tracing::info!(user_id = %id, "identity deleted");
        }
        Ok(rows_affected > 0)
    }
}
