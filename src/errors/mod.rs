//! Error handling module for the CertManager backend.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::models::FieldErrors;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Missing or stale session
    Unauthorized(String),
    /// Record not found; `redirect` names the page to fall back to
    NotFound {
        message: String,
        redirect: Option<String>,
    },
    /// Form validation failed
    Validation { message: String, fields: FieldErrors },
    /// Database error
    Database(String),
    /// Internal server error
    Internal(String),
    /// Bad request
    BadRequest(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::NotFound { .. } => codes::NOT_FOUND,
            AppError::Validation { .. } => codes::VALIDATION_ERROR,
            AppError::Database(_) => codes::DATABASE_ERROR,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> &str {
        match self {
            AppError::Unauthorized(msg) => msg,
            AppError::NotFound { message, .. } => message,
            AppError::Validation { message, .. } => message,
            AppError::Database(msg) => msg,
            AppError::Internal(msg) => msg,
            AppError::BadRequest(msg) => msg,
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::NotFound {
                redirect: Some(redirect),
                ..
            } => Some(serde_json::json!({ "redirect": redirect })),
            AppError::Validation { fields, .. } => Some(serde_json::json!({ "fields": fields })),
            _ => None,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::Database(format!("Database error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::BadRequest(format!("JSON error: {}", err))
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
}

impl From<&AppError> for ErrorResponse {
    fn from(error: &AppError) -> Self {
        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.message().to_string(),
                details: error.details(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_carries_redirect() {
        let err = AppError::NotFound {
            message: "Award not found".into(),
            redirect: Some("/dashboard/awards".into()),
        };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let body = serde_json::to_value(ErrorResponse::from(&err)).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["details"]["redirect"], "/dashboard/awards");

        let plain = AppError::NotFound {
            message: "gone".into(),
            redirect: None,
        };
        let plain = serde_json::to_value(ErrorResponse::from(&plain)).unwrap();
        assert!(plain["error"].get("details").is_none());
    }

    #[test]
    fn test_validation_lists_fields() {
        let mut fields = FieldErrors::new();
        fields.insert("name".into(), "Award name is required".into());
        let err = AppError::Validation {
            message: "Please fix the errors in the form".into(),
            fields,
        };
        assert_eq!(err.error_code(), codes::VALIDATION_ERROR);
        assert_eq!(
            err.to_string(),
            "VALIDATION_ERROR: Please fix the errors in the form"
        );

        let body = serde_json::to_value(ErrorResponse::from(&err)).unwrap();
        assert_eq!(
            body["error"]["details"]["fields"]["name"],
            "Award name is required"
        );
    }
}
