//! Identity endpoints.
//!
//! - `POST /api/register` — create an identity and issue its bearer token
//! - `POST /api/logout` — revoke the token the request was made with

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use care_registry_core::IssuedToken;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CallerContext};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(default)]
    pub email: String,
}

pub async fn register(
    State(ctx): State<ApiContext>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<IssuedToken>), ApiError> {
    let Json(req) = payload?;
    let issued = ctx.with_access(|access| access.register(req.username, req.email))?;
    Ok((StatusCode::CREATED, Json(issued)))
}

pub async fn logout(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
) -> Result<StatusCode, ApiError> {
    ctx.with_access(|access| access.revoke_token(caller.caller(), &caller.token))?;
    Ok(StatusCode::NO_CONTENT)
}
