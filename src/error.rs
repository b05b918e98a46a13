use crate::models::{DanglingCategory, ValidationIssue};
use crate::store::StoreError;
use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::Serialize;
use tracing::{debug, error};

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: u16,
    pub message: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("resource not found")]
    NotFound,
    #[error("search term missing or empty")]
    MissingSearchTerm,
    #[error("unprocessable request")]
    Unprocessable(Vec<ValidationIssue>),
    #[error("bad request")]
    BadRequest,
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound | AppError::MissingSearchTerm => StatusCode::NOT_FOUND,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            AppError::NotFound | AppError::MissingSearchTerm => "Not found",
            AppError::Unprocessable(_) => "unprocessable",
            AppError::BadRequest => "bad request",
            AppError::Internal(_) => "internal server error",
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        error!("storage failure: {}", err);
        AppError::Internal(err.to_string())
    }
}

impl From<DanglingCategory> for AppError {
    fn from(err: DanglingCategory) -> Self {
        error!("category lookup failed: {}", err);
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Unprocessable(issues) = &self {
            debug!(?issues, "rejecting unprocessable request");
        }
        let status = self.status();
        let payload = ErrorBody {
            success: false,
            error: status.as_u16(),
            message: self.message(),
        };
        (status, Json(payload)).into_response()
    }
}
