pub mod health;
pub mod metrics;
pub mod positions;
pub mod session_control;
pub mod users;
pub mod wallets;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::Json;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::Pagination;

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

#[derive(Serialize)]
pub struct PagedResponse<T: Serialize> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

/// Unwrap a JSON body, reporting malformed input as an invalid argument.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(v)| v)
        .map_err(|e| AppError::InvalidArgument(format!("Invalid JSON body: {}", e.body_text())))
}

pub(crate) fn path_param<T>(path: Result<Path<T>, PathRejection>) -> Result<T, AppError> {
    path.map(|Path(v)| v)
        .map_err(|e| AppError::InvalidArgument(format!("Invalid path: {}", e.body_text())))
}

pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    query
        .map(|Query(v)| v)
        .map_err(|e| AppError::InvalidArgument(format!("Invalid query: {}", e.body_text())))
}
