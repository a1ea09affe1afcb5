//! Patient/doctor assignment endpoints.
//!
//! - `POST /api/mappings` — assign `{patient, doctor}`
//! - `GET /api/mappings`, `GET|DELETE /api/mappings/:id`
//! - `GET /api/mappings/patient/:patient_id` — assignments of one patient
//! - `GET /api/mappings/doctor/:doctor_id` — assignments of one doctor

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use care_registry_core::{MappingInput, PatientDoctorMapping};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CallerContext};

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    payload: Result<Json<MappingInput>, JsonRejection>,
) -> Result<(StatusCode, Json<PatientDoctorMapping>), ApiError> {
    let Json(input) = payload?;
    let mapping = ctx.with_access(|access| access.create_mapping(caller.caller(), input))?;
    Ok((StatusCode::CREATED, Json(mapping)))
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
) -> Result<Json<Vec<PatientDoctorMapping>>, ApiError> {
    let mappings = ctx.with_access(|access| access.list_mappings(caller.caller()))?;
    Ok(Json(mappings))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Result<Json<PatientDoctorMapping>, ApiError> {
    let mapping = ctx.with_access(|access| access.get_mapping(caller.caller(), &id))?;
    Ok(Json(mapping))
}

pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    ctx.with_access(|access| access.delete_mapping(caller.caller(), &id))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn for_patient(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(patient_id): Path<String>,
) -> Result<Json<Vec<PatientDoctorMapping>>, ApiError> {
    let mappings =
        ctx.with_access(|access| access.list_mappings_for_patient(caller.caller(), &patient_id))?;
    Ok(Json(mappings))
}

pub async fn for_doctor(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Vec<PatientDoctorMapping>>, ApiError> {
    let mappings =
        ctx.with_access(|access| access.list_mappings_for_doctor(caller.caller(), &doctor_id))?;
    Ok(Json(mappings))
}
