//! HTTP handlers for the course and student resources.

pub mod course;
pub mod student;

use crate::error::AppError;
use crate::model::ListFilter;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query,
    },
    http::StatusCode,
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

fn body_to_map(body: Result<Json<Value>, JsonRejection>) -> Result<HashMap<String, Value>, AppError> {
    let Json(value) = body.map_err(|e| match e.status() {
        StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge(e.body_text()),
        _ => AppError::BadRequest(e.body_text()),
    })?;
    match value {
        Value::Object(m) => Ok(m.into_iter().collect()),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

/// Body for PUT/PATCH. The id comes from the path; an id in the body is ignored.
fn update_body(body: Result<Json<Value>, JsonRejection>) -> Result<HashMap<String, Value>, AppError> {
    let mut body = body_to_map(body)?;
    body.remove("id");
    Ok(body)
}

/// Query string as a `ListFilter`. `?name=` with an empty value means "no name filter".
fn list_filter(query: Result<Query<ListFilter>, QueryRejection>) -> Result<ListFilter, AppError> {
    let Query(mut filter) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    filter.name = filter.name.filter(|n| !n.is_empty());
    Ok(filter)
}
