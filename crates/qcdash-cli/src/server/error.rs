//! API error types and handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use qcdash::DashboardError;
use serde::Serialize;

/// API error type.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Internal server error.
    Internal(String),
    /// Error from the dashboard library.
    Dashboard(DashboardError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Dashboard(e) => match e {
                DashboardError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                DashboardError::NoDataLoaded
                | DashboardError::UnknownColumn(_)
                | DashboardError::InvalidFilter(_)
                | DashboardError::Json(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::UNPROCESSABLE_ENTITY,
            },
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::Internal(_) => "internal",
            ApiError::Dashboard(e) => e.kind(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.kind().to_string();
        let message = match self {
            ApiError::NotFound(msg) | ApiError::Internal(msg) => msg,
            ApiError::Dashboard(e) => e.to_string(),
        };

        if status.is_server_error() {
            log::error!("{error}: {message}");
        } else {
            log::debug!("request failed with {error}: {message}");
        }

        (status, Json(ErrorResponse { error, message })).into_response()
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        ApiError::Dashboard(err)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("load task failed: {}", err))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Dashboard(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ApiError {}
