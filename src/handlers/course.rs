//! Course CRUD handlers: list, read, create, update (PUT), partial update (PATCH), delete.

use super::{body_to_map, update_body};
use crate::error::AppError;
use crate::extractors::RecordId;
use crate::model::{CourseChanges, ListFilter, NewCourse};
use crate::response;
use crate::service::{CourseService, RequestValidator, COURSE_FIELDS};
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
    let rows = CourseService::list(state.store(), &filter).await?;
    Ok(response::ok_many(rows))
}

pub async fn read(State(state): State<AppState>, RecordId(id): RecordId) -> Result<impl IntoResponse, AppError> {
    let row = CourseService::read(state.store(), id).await?;
    Ok(response::ok(row))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = body_to_map(body)?;
    let course: NewCourse = RequestValidator::parse(body, COURSE_FIELDS, false)?;
    let row = CourseService::create(state.store(), course, state.max_students_per_course).await?;
    Ok(response::created(row))
}

pub async fn update(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let changes: CourseChanges = RequestValidator::parse(update_body(body)?, COURSE_FIELDS, false)?;
    let row = CourseService::update(state.store(), id, changes, state.max_students_per_course).await?;
    Ok(response::ok(row))
}

pub async fn partial_update(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let changes: CourseChanges = RequestValidator::parse(update_body(body)?, COURSE_FIELDS, true)?;
    let row = CourseService::update(state.store(), id, changes, state.max_students_per_course).await?;
    Ok(response::ok(row))
}

pub async fn delete(State(state): State<AppState>, RecordId(id): RecordId) -> Result<impl IntoResponse, AppError> {
    CourseService::delete(state.store(), id).await?;
    Ok(response::no_content())
}
