//! Patient endpoints. Every route is scoped to the caller's own
//! patient record; other patients answer 404.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use care_registry_core::{Patient, PatientInput, PatientPatch};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CallerContext};

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    payload: Result<Json<PatientInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    let Json(input) = payload?;
    let patient = ctx.with_access(|access| access.create_patient(caller.caller(), input))?;
    Ok((StatusCode::CREATED, Json(patient)))
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
) -> Result<Json<Vec<Patient>>, ApiError> {
    let patients = ctx.with_access(|access| access.list_patients(caller.caller()))?;
    Ok(Json(patients))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Result<Json<Patient>, ApiError> {
    let patient = ctx.with_access(|access| access.get_patient(caller.caller(), &id))?;
    Ok(Json(patient))
}

pub async fn replace(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    payload: Result<Json<PatientInput>, JsonRejection>,
) -> Result<Json<Patient>, ApiError> {
    let Json(input) = payload?;
    let patient =
        ctx.with_access(|access| access.update_patient(caller.caller(), &id, input.into()))?;
    Ok(Json(patient))
}

pub async fn patch(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    payload: Result<Json<PatientPatch>, JsonRejection>,
) -> Result<Json<Patient>, ApiError> {
    let Json(patch) = payload?;
    let patient = ctx.with_access(|access| access.update_patient(caller.caller(), &id, patch))?;
    Ok(Json(patient))
}

pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    ctx.with_access(|access| access.delete_patient(caller.caller(), &id))?;
    Ok(StatusCode::NO_CONTENT)
}
