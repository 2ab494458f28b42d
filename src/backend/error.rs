#![cfg(feature = "server")]
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dioxus::logger::tracing::{error, warn};
use serde::Serialize;

use crate::backend::calculator::CalcError;
use crate::backend::convert::ConvertError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Convert(#[from] ConvertError),
    #[error("{0}")]
    Calc(#[from] CalcError),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not signed in")]
    Unauthorized,
    #[error("missing or mismatched anti-forgery token")]
    Forbidden,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Convert(_) => (StatusCode::BAD_REQUEST, "INVALID_VALUE"),
            ApiError::Calc(CalcError::Overflow(_)) => (StatusCode::UNPROCESSABLE_ENTITY, "OVERFLOW"),
            ApiError::Calc(_) => (StatusCode::BAD_REQUEST, "INVALID_RANGE"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status();
        if status.is_server_error() {
            error!(error_code = %code, "[api] {self}");
        } else if status != StatusCode::UNAUTHORIZED {
            warn!(error_code = %code, "[api] {self}");
        }
        let body = ErrorBody {
            code,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
