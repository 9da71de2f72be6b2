use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{Outcome, ParseNameError, StatField, Stats};

#[derive(Debug, Serialize)]
pub struct FieldValue {
    pub field: StatField,
    pub value: u32,
}

#[derive(Debug, Deserialize)]
pub struct SetValueRequest {
    pub value: i64,
}

fn parse_field(name: &str) -> Result<StatField, ApiError> {
    name.parse()
        .map_err(|e: ParseNameError| ApiError::NotFound(e.to_string()))
}

fn parse_outcome(name: &str) -> Result<Outcome, ApiError> {
    name.parse()
        .map_err(|e: ParseNameError| ApiError::NotFound(e.to_string()))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

pub async fn get_stats(State(state): State<AppState>) -> Result<Json<Stats>, ApiError> {
    Ok(Json(state.service.get_stats().await?))
}

pub async fn put_stats(
    State(state): State<AppState>,
    payload: Result<Json<Stats>, JsonRejection>,
) -> Result<Json<Stats>, ApiError> {
    let stats = body(payload)?;
    Ok(Json(state.service.set_stats(stats).await?))
}

pub async fn get_field(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<FieldValue>, ApiError> {
    let field = parse_field(&name)?;
    let value = state.service.get_field(field).await?;
    Ok(Json(FieldValue { field, value }))
}

pub async fn put_field(
    State(state): State<AppState>,
    Path(name): Path<String>,
    payload: Result<Json<SetValueRequest>, JsonRejection>,
) -> Result<Json<Stats>, ApiError> {
    let field = parse_field(&name)?;
    let request = body(payload)?;
    Ok(Json(state.service.set_field(field, request.value).await?))
}

pub async fn record_outcome(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Stats>, ApiError> {
    let outcome = parse_outcome(&name)?;
    Ok(Json(state.service.record_outcome(outcome).await?))
}
