// HTTP error types for the admin surface
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// Admin API error with appropriate status codes and client-friendly messages.
///
/// Database errors carry the driver error for server-side logging only; the
/// client always sees a generic message.
#[derive(Debug)]
pub enum AdminError {
    // 401 Unauthorized
    Unauthenticated,
    SessionExpired,

    // 403 Forbidden
    InvalidCsrf,

    // 400 Bad Request
    BadRequest(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    Database(sqlx::Error),
    Internal(String),
}

impl AdminError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AdminError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AdminError::SessionExpired => StatusCode::UNAUTHORIZED,
            AdminError::InvalidCsrf => StatusCode::FORBIDDEN,
            AdminError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AdminError::NotFound(_) => StatusCode::NOT_FOUND,
            AdminError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AdminError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-safe error message
    pub fn message(&self) -> String {
        match self {
            AdminError::Unauthenticated => "Authentication required".to_string(),
            AdminError::SessionExpired => "Session expired".to_string(),
            AdminError::InvalidCsrf => "Invalid or missing CSRF token".to_string(),
            AdminError::BadRequest(msg) => msg.clone(),
            AdminError::NotFound(msg) => msg.clone(),
            // Never echo driver error text to the client
            AdminError::Database(_) => "Database error occurred".to_string(),
            AdminError::Internal(_) => "An internal error occurred".to_string(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AdminError::Unauthenticated => "UNAUTHENTICATED",
            AdminError::SessionExpired => "SESSION_EXPIRED",
            AdminError::InvalidCsrf => "INVALID_CSRF",
            AdminError::BadRequest(_) => "BAD_REQUEST",
            AdminError::NotFound(_) => "NOT_FOUND",
            AdminError::Database(_) => "DATABASE_ERROR",
            AdminError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "message": self.message(),
            "code": self.error_code(),
        })
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        AdminError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AdminError::NotFound(message.into())
    }
}

impl From<sqlx::Error> for AdminError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AdminError::not_found("Record not found"),
            other => AdminError::Database(other),
        }
    }
}

impl std::fmt::Display for AdminError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdminError::Database(e) => write!(f, "database error: {}", e),
            other => write!(f, "{}", other.message()),
        }
    }
}

impl std::error::Error for AdminError {}

impl IntoResponse for AdminError {
    fn into_response(self) -> axum::response::Response {
        if let AdminError::Database(ref e) = self {
            tracing::error!("database error at dispatch boundary: {}", e);
        }
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
