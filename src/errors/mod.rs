//! Error handling module for the poll server.
//!
//! Provides centralized error types with mapping to HTTP status codes, plain
//! message bodies for the HTML pages and a JSON envelope for the API routes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Message shown for any unknown event id.
pub const EVENT_NOT_FOUND: &str = "Event does not exist";

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const DATA_CORRUPTION: &str = "DATA_CORRUPTION";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const TEMPLATE_ERROR: &str = "TEMPLATE_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Event id unknown or one of its files missing
    NotFound(String),
    /// Rejected input
    Validation(String),
    /// A stored file could not be parsed
    DataCorruption(String),
    /// Filesystem failure
    Storage(String),
    /// Template rendering failure
    Template(String),
    /// Internal server error
    Internal(String),
}

impl AppError {
    /// The fixed not-found error every unknown event id maps to.
    pub fn event_not_found() -> Self {
        AppError::NotFound(EVENT_NOT_FOUND.to_string())
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DataCorruption(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::DataCorruption(_) => codes::DATA_CORRUPTION,
            AppError::Storage(_) => codes::STORAGE_ERROR,
            AppError::Template(_) => codes::TEMPLATE_ERROR,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::NotFound(msg) => msg.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::DataCorruption(msg) => msg.clone(),
            AppError::Storage(msg) => msg.clone(),
            AppError::Template(msg) => msg.clone(),
            AppError::Internal(msg) => msg.clone(),
        }
    }

    /// Message safe to show to a visitor. Server-side failures stay in the log.
    pub fn public_message(&self) -> String {
        match self {
            AppError::NotFound(_) | AppError::Validation(_) => self.message(),
            _ => "Internal server error".to_string(),
        }
    }

    fn log(&self) {
        if self.status_code().is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("{}", self);
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(format!("I/O error: {}", err))
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        match err.kind() {
            csv::ErrorKind::Io(_) => AppError::Storage(format!("CSV I/O error: {}", err)),
            _ => AppError::DataCorruption(format!("Malformed CSV: {}", err)),
        }
    }
}

impl From<tera::Error> for AppError {
    fn from(err: tera::Error) -> Self {
        AppError::Template(format!("Template error: {:?}", err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        (self.status_code(), self.public_message()).into_response()
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.public_message(),
            },
        }
    }
}

/// Wrapper that renders an [`AppError`] as the JSON envelope.
#[derive(Debug)]
pub struct JsonError(pub AppError);

impl From<AppError> for JsonError {
    fn from(err: AppError) -> Self {
        JsonError(err)
    }
}

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        self.0.log();
        let status = self.0.status_code();
        (status, Json(ErrorResponse::new(&self.0))).into_response()
    }
}
