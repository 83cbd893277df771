//! Error taxonomy shared by the engine and the HTTP boundary.
//!
//! Every engine operation returns [`AppError`]. Validation failures are raised
//! before any store mutation; persistence failures carry the operation and key
//! so the caller can decide whether to retry.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

/// Message returned for every failed resolution. Unknown and expired codes are
/// deliberately indistinguishable.
pub const NOT_FOUND_OR_EXPIRED: &str = "Link not found or expired";

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Serializable error payload used in API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Target address is not a well-formed absolute http(s) URL.
    #[error("Invalid URL: {reason}")]
    InvalidUrl { reason: String },

    /// Malformed caller input, e.g. a custom code with illegal characters.
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// Custom code was already claimed by an active or retired link.
    #[error("Short code '{code}' is already taken")]
    CodeTaken { code: String },

    /// Every generated candidate collided with the historical code space.
    #[error("Could not generate a unique short code after {attempts} attempts")]
    CodeSpaceExhausted { attempts: usize },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    /// Underlying store I/O error. Never retried internally.
    #[error("Persistence failure during {operation} on '{key}': {message}")]
    Persistence {
        operation: &'static str,
        key: String,
        message: String,
    },
}

impl AppError {
    pub fn invalid_url(reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            reason: reason.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    /// The single not-found signal used by resolution paths.
    pub fn link_unavailable(code: &str) -> Self {
        Self::not_found(NOT_FOUND_OR_EXPIRED, json!({ "code": code }))
    }

    pub fn code_taken(code: impl Into<String>) -> Self {
        Self::CodeTaken { code: code.into() }
    }

    pub fn persistence(
        operation: &'static str,
        key: impl Into<String>,
        err: impl std::fmt::Display,
    ) -> Self {
        Self::Persistence {
            operation,
            key: key.into(),
            message: err.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidUrl { .. } | AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::CodeTaken { .. } => StatusCode::CONFLICT,
            AppError::CodeSpaceExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts the error into its wire representation.
    ///
    /// Persistence details stay in the logs; clients only learn which
    /// operation failed.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (code, details) = match self {
            AppError::InvalidUrl { reason } => ("invalid_url", json!({ "reason": reason })),
            AppError::Validation { details, .. } => ("validation_error", details.clone()),
            AppError::CodeTaken { code } => ("code_taken", json!({ "code": code })),
            AppError::CodeSpaceExhausted { attempts } => {
                ("code_space_exhausted", json!({ "attempts": attempts }))
            }
            AppError::NotFound { details, .. } => ("not_found", details.clone()),
            AppError::Persistence { operation, .. } => {
                ("persistence_failure", json!({ "operation": operation }))
            }
        };

        let message = match self {
            AppError::Persistence { .. } => "Storage is temporarily unavailable".to_string(),
            other => other.to_string(),
        };

        ErrorInfo {
            code,
            message,
            details,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::bad_request("Request validation failed", json!(errors))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Persistence { .. } = &self {
            tracing::error!(error = %self, "Request failed on persistence layer");
        }

        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::invalid_url("nope").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::code_taken("promo").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::link_unavailable("abc").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::CodeSpaceExhausted { attempts: 10 }.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_persistence_error_keeps_context() {
        let err = AppError::persistence("insert_link", "abc123", "connection reset");
        let text = err.to_string();

        assert!(text.contains("insert_link"));
        assert!(text.contains("abc123"));
        assert!(text.contains("connection reset"));
    }

    #[test]
    fn test_persistence_error_info_hides_message() {
        let err = AppError::persistence("record_click", "abc123", "password=hunter2");
        let info = err.to_error_info();

        assert_eq!(info.code, "persistence_failure");
        assert!(!info.message.contains("hunter2"));
        assert_eq!(info.details["operation"], "record_click");
    }

    #[test]
    fn test_not_found_message_is_uniform() {
        let info = AppError::link_unavailable("gone").to_error_info();
        assert_eq!(info.message, NOT_FOUND_OR_EXPIRED);
        assert_eq!(info.code, "not_found");
    }
}
