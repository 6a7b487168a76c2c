//! Custom error types for the API service

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Per-field validation messages, keyed by request field name
#[derive(Debug, Default, Clone, Serialize, PartialEq)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set holding a single message
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record a message against a field
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Record the error of a field check, if any
    pub fn check(&mut self, field: &str, result: Result<(), String>) {
        if let Err(message) = result {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when no field failed, otherwise a validation error
    pub fn into_result(self) -> ApiResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self))
        }
    }
}

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed input, reported per field
    #[error("Validation failed")]
    Validation(ValidationErrors),

    /// Missing, invalid or revoked credentials
    #[error("Unauthorized")]
    Unauthorized,

    /// Resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness violation, e.g. duplicate favorite or email
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Too many failed attempts; retry after the given number of seconds
    #[error("Too many requests, retry after {retry_after}s")]
    TooManyRequests { retry_after: u64 },

    /// CSRF cookie and header disagree
    #[error("CSRF token mismatch")]
    CsrfMismatch,

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,

    /// Body or query string that could not be decoded
    #[error("Malformed request: {message}")]
    Malformed { status: StatusCode, message: String },
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Malformed {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Malformed {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl ApiError {
    /// HTTP status the error is reported with
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            // Session-expired status used by cookie-based SPA backends
            ApiError::CsrfMismatch => {
                StatusCode::from_u16(419).unwrap_or(StatusCode::FORBIDDEN)
            }
            ApiError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Malformed { status, .. } => *status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let retry_after = match &self {
            ApiError::TooManyRequests { retry_after } => Some(*retry_after),
            _ => None,
        };
        let body = match self {
            ApiError::Validation(errors) => json!({
                "success": false,
                "error": "The given data was invalid.",
                "errors": errors,
            }),
            ApiError::Unauthorized => json!({"success": false, "error": "Unauthorized"}),
            ApiError::NotFound(msg) | ApiError::Conflict(msg) => {
                json!({"success": false, "error": msg})
            }
            ApiError::TooManyRequests { retry_after } => json!({
                "success": false,
                "error": "Too many login attempts. Please try again later.",
                "retry_after": retry_after,
            }),
            ApiError::CsrfMismatch => json!({"success": false, "error": "CSRF token mismatch"}),
            ApiError::InternalServerError => {
                json!({"success": false, "error": "Internal server error"})
            }
            ApiError::Malformed { message, .. } => json!({"success": false, "error": message}),
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(seconds) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        }
        response
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_errors_are_reported_per_field() {
        let mut errors = ValidationErrors::new();
        errors.add("email", "The email field is required.");
        errors.add("email", "The email must be a valid email address.");
        errors.add("name", "The name field is required.");

        let response = ApiError::Validation(errors).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"]["email"].as_array().unwrap().len(), 2);
        assert_eq!(body["errors"]["name"][0], "The name field is required.");
    }

    #[tokio::test]
    async fn internal_errors_do_not_leak_details() {
        let response = ApiError::InternalServerError.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(
            body,
            json!({"success": false, "error": "Internal server error"})
        );
    }

    #[tokio::test]
    async fn throttled_responses_carry_retry_after() {
        let response = ApiError::TooManyRequests { retry_after: 42 }.into_response();
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");

        let body = body_json(response).await;
        assert_eq!(body["retry_after"], 42);
    }

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Conflict("dup".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::NotFound("gone".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::CsrfMismatch.status().as_u16(), 419);
        assert_eq!(
            ApiError::TooManyRequests { retry_after: 5 }.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert!(ValidationErrors::new().into_result().is_ok());
    }
}
