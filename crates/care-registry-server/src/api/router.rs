//! HTTP router for the care registry.
//!
//! Routes are nested under `/api/`. Everything except `/register` and
//! `/health` requires a bearer token.
//!
//! Middleware stack (outermost → innermost):
//! 1. Context extension → 2. Auth validator → 3. Access logger

use std::sync::{Arc, Mutex};

use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::{Extension, Router};

use care_registry_core::Database;

use crate::api::endpoints::{auth as identity, doctors, health, mappings, patients};
use crate::api::middleware::{audit, auth};
use crate::api::types::ApiContext;

/// Build the registry API router over a shared database handle.
///
/// Middleware reads `ApiContext` from `Extension` (outermost layer);
/// handlers read it through `State`.
pub fn api_router(db: Arc<Mutex<Database>>) -> Router {
    build_router(ApiContext::new(db))
}

fn build_router(ctx: ApiContext) -> Router {
    // route_layer keeps unmatched paths at 404 instead of 401.
    // Path params use `:param` syntax (axum 0.7).
    let protected = Router::new()
        .route("/doctors", get(doctors::list).post(doctors::create))
        .route(
            "/doctors/:id",
            get(doctors::detail)
                .put(doctors::replace)
                .patch(doctors::patch)
                .delete(doctors::remove),
        )
        .route("/patients", get(patients::list).post(patients::create))
        .route(
            "/patients/:id",
            get(patients::detail)
                .put(patients::replace)
                .patch(patients::patch)
                .delete(patients::remove),
        )
        .route("/mappings", get(mappings::list).post(mappings::create))
        .route(
            "/mappings/:id",
            get(mappings::detail).delete(mappings::remove),
        )
        .route(
            "/mappings/patient/:patient_id",
            get(mappings::for_patient),
        )
        .route("/mappings/doctor/:doctor_id", get(mappings::for_doctor))
        .route("/logout", post(identity::logout))
        .with_state(ctx.clone())
        .route_layer(from_fn(audit::log_access))
        .route_layer(from_fn(auth::require_auth));

    let unprotected = Router::new()
        .route("/register", post(identity::register))
        .route("/health", get(health::check))
        .with_state(ctx.clone())
        .route_layer(from_fn(audit::log_access));

    Router::new()
        .nest("/api", protected.merge(unprotected))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(Extension(ctx))
}
