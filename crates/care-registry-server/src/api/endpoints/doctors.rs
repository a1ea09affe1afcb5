//! Doctor endpoints.
//!
//! - `POST /api/doctors` — create the caller's doctor profile
//! - `GET /api/doctors` — list all doctors
//! - `GET|PUT|PATCH|DELETE /api/doctors/:id`
//!
//! Any `user` field in a request body is ignored; the profile always
//! belongs to the authenticated caller.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use care_registry_core::{Doctor, DoctorInput, DoctorPatch};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CallerContext};

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    payload: Result<Json<DoctorInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Doctor>), ApiError> {
    let Json(input) = payload?;
    let doctor = ctx.with_access(|access| access.create_doctor(caller.caller(), input))?;
    Ok((StatusCode::CREATED, Json(doctor)))
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
) -> Result<Json<Vec<Doctor>>, ApiError> {
    let doctors = ctx.with_access(|access| access.list_doctors(caller.caller()))?;
    Ok(Json(doctors))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Result<Json<Doctor>, ApiError> {
    let doctor = ctx.with_access(|access| access.get_doctor(caller.caller(), &id))?;
    Ok(Json(doctor))
}

/// `PUT` — full replacement; every field is required.
pub async fn replace(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    payload: Result<Json<DoctorInput>, JsonRejection>,
) -> Result<Json<Doctor>, ApiError> {
    let Json(input) = payload?;
    let doctor =
        ctx.with_access(|access| access.update_doctor(caller.caller(), &id, input.into()))?;
    Ok(Json(doctor))
}

/// `PATCH` — absent fields are left unchanged.
pub async fn patch(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    payload: Result<Json<DoctorPatch>, JsonRejection>,
) -> Result<Json<Doctor>, ApiError> {
    let Json(patch) = payload?;
    let doctor = ctx.with_access(|access| access.update_doctor(caller.caller(), &id, patch))?;
    Ok(Json(doctor))
}

pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    ctx.with_access(|access| access.delete_doctor(caller.caller(), &id))?;
    Ok(StatusCode::NO_CONTENT)
}
