// HTTP API Error Types
use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::database::StoreError;
use crate::validation::FieldError;

/// HTTP API error with appropriate status codes and client-friendly messages.
///
/// This is the only place failures become response bodies.
#[derive(Debug, Clone)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Vec<FieldError>,
    },
    InvalidJson(String),
    InvalidId(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error; `detail` is never shown outside development
    InternalServerError {
        message: String,
        detail: Option<String>,
    },
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError { .. } => 400,
            ApiError::InvalidJson(_) => 400,
            ApiError::InvalidId(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InternalServerError { .. } => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::InvalidId(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError { message, .. } => message,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::InvalidId(_) => "INVALID_ID",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    /// "fail" for client errors, "error" for server errors
    pub fn status(&self) -> &'static str {
        if self.status_code() < 500 {
            "fail"
        } else {
            "error"
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "success": false,
            "status": self.status(),
            "statusCode": self.status_code(),
            "code": self.error_code(),
            "message": self.message(),
        });

        if let ApiError::ValidationError { field_errors, .. } = self {
            response["errors"] = json!(field_errors);
        }

        response
    }

    /// JSON body including private diagnostics, for development builds only
    pub fn to_json_verbose(&self) -> Value {
        let mut response = self.to_json();
        if let ApiError::InternalServerError { detail: Some(detail), .. } = self {
            response["detail"] = Value::String(detail.clone());
        }
        response
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(field_errors: Vec<FieldError>) -> Self {
        let message = field_errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        ApiError::ValidationError {
            message: format!("Validation Error: {}", message),
            field_errors,
        }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn invalid_id() -> Self {
        ApiError::InvalidId("Invalid ID format".to_string())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError {
            message: message.into(),
            detail: None,
        }
    }

    /// Internal error whose cause is logged and kept for development responses
    pub fn internal(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        tracing::error!("Internal error: {}", detail);
        ApiError::InternalServerError {
            message: "An error occurred while processing your request".to_string(),
            detail: Some(detail),
        }
    }
}

// Convert other error types to ApiError
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidId(_) => ApiError::invalid_id(),
            StoreError::Conflict { field, .. } => {
                ApiError::conflict(format!("Duplicate field value entered: {}", field))
            }
            StoreError::Backend(msg) => ApiError::internal(format!("Store error: {}", msg)),
            StoreError::Corrupt(msg) => ApiError::internal(format!("Corrupt record: {}", msg)),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => ApiError::unauthorized("Authentication required"),
            AuthError::MalformedHeader => {
                ApiError::unauthorized("Authorization header must use Bearer token format")
            }
            AuthError::InvalidToken => ApiError::unauthorized("Invalid token"),
            AuthError::Expired => ApiError::unauthorized("Token has expired"),
            AuthError::InvalidCredentials => ApiError::unauthorized("Invalid email or password"),
            AuthError::UnknownSubject => ApiError::unauthorized("Unauthorized"),
            AuthError::Hashing(msg) => ApiError::internal(format!("Password hashing failed: {}", msg)),
            AuthError::Signing(msg) => ApiError::internal(format!("Token signing failed: {}", msg)),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_json(rejection.body_text())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(self.to_json())).into_response();
        // Picked up by the development-only detail layer
        response.extensions_mut().insert(self);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_carry_field_list() {
        let err = ApiError::validation_error(vec![
            FieldError::new("name", "Name is required"),
            FieldError::new("price", "Price is required"),
        ]);
        let body = err.to_json();
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["status"], "fail");
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
        assert_eq!(body["errors"][1]["field"], "price");
    }

    #[test]
    fn store_conflict_maps_to_409() {
        let err: ApiError = StoreError::Conflict {
            field: "email".into(),
            message: "duplicate key".into(),
        }
        .into();
        assert_eq!(err.status_code(), 409);
        assert!(err.message().contains("email"));
    }

    #[test]
    fn invalid_id_maps_to_400() {
        let err: ApiError = StoreError::InvalidId("abc".into()).into();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Invalid ID format");
    }

    #[test]
    fn backend_detail_only_in_verbose_body() {
        let err: ApiError = StoreError::Backend("connection reset".into()).into();
        let body = err.to_json();
        assert_eq!(body["status"], "error");
        assert!(body.get("detail").is_none());
        assert!(!body.to_string().contains("connection reset"));

        let verbose = err.to_json_verbose();
        assert!(verbose["detail"].as_str().unwrap().contains("connection reset"));
    }

    #[test]
    fn expired_and_invalid_tokens_are_401() {
        assert_eq!(ApiError::from(AuthError::Expired).status_code(), 401);
        assert_eq!(ApiError::from(AuthError::InvalidToken).status_code(), 401);
        assert_eq!(ApiError::from(AuthError::Hashing("x".into())).status_code(), 500);
    }
}
