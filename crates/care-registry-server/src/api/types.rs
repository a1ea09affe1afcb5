//! Shared types for the API layer.

use std::sync::{Arc, Mutex};

use care_registry_core::{AccessLayer, AccessResult, Database, Identity};

use crate::api::error::ApiError;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub db: Arc<Mutex<Database>>,
}

impl ApiContext {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    /// Run `op` against the access layer. The database lock is held
    /// only for the duration of `op`, never across an await point.
    pub fn with_access<T>(
        &self,
        op: impl FnOnce(&AccessLayer<'_>) -> AccessResult<T>,
    ) -> Result<T, ApiError> {
        let db = self
            .db
            .lock()
            .map_err(|_| ApiError::Internal("database lock poisoned".into()))?;
        Ok(op(&AccessLayer::new(&db))?)
    }
}

/// Authenticated caller, injected into request extensions by the auth
/// middleware.
#[derive(Debug, Clone)]
pub struct CallerContext {
    pub identity: Identity,
    /// The bearer token this request authenticated with.
    pub token: String,
}

impl CallerContext {
    /// The caller in the shape the access layer expects.
    pub fn caller(&self) -> Option<&Identity> {
        Some(&self.identity)
    }
}
