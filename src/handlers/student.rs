//! Student CRUD handlers.

use super::{body_to_map, update_body};
use crate::error::AppError;
use crate::extractors::RecordId;
use crate::model::{ListFilter, NewStudent, StudentChanges};
use crate::response;
use crate::service::{RequestValidator, StudentService, STUDENT_FIELDS};
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    response::IntoResponse,
    Json,
};
use serde_json::Value;

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListFilter>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let filter = super::list_filter(query)?;
    let rows = StudentService::list(state.store(), &filter).await?;
    Ok(response::ok_many(rows))
}

pub async fn read(State(state): State<AppState>, RecordId(id): RecordId) -> Result<impl IntoResponse, AppError> {
    Ok(response::ok(StudentService::read(state.store(), id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let student: NewStudent = RequestValidator::parse(body_to_map(body)?, STUDENT_FIELDS, false)?;
    let row = StudentService::create(state.store(), student).await?;
    Ok(response::created(row))
}

pub async fn update(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let changes: StudentChanges = RequestValidator::parse(update_body(body)?, STUDENT_FIELDS, false)?;
    Ok(response::ok(StudentService::update(state.store(), id, changes).await?))
}

pub async fn partial_update(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let changes: StudentChanges = RequestValidator::parse(update_body(body)?, STUDENT_FIELDS, true)?;
    Ok(response::ok(StudentService::update(state.store(), id, changes).await?))
}

pub async fn delete(State(state): State<AppState>, RecordId(id): RecordId) -> Result<impl IntoResponse, AppError> {
    StudentService::delete(state.store(), id).await?;
    Ok(response::no_content())
}
