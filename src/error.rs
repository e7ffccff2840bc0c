/// Application Error Handling
///
/// One error type for the whole service, built from domain-specific
/// error enums:
/// 1. Validation errors for request input
/// 2. Persistence errors from the user store
/// 3. Authentication and authorization outcomes of the auth core
///
/// `AppError` maps each of these to an HTTP status and a structured JSON body.
/// `ConfigError` stays outside it: it is only raised at startup, before the
/// server accepts requests.

use actix_web::{
    error::ResponseError,
    http::{header, StatusCode},
    HttpResponse,
};
use std::error::Error as StdError;
use std::fmt;

/// Validation errors for input data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyField(String),
    TooShort(String, usize),
    TooLong(String, usize),
    InvalidFormat(String),
    AlreadyExists(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooShort(field, min) => {
                write!(f, "{} is too short (minimum {} characters)", field, min)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
            ValidationError::AlreadyExists(field) => write!(
                f,
                "The user with this {} already exists in the system.",
                field
            ),
        }
    }
}

impl StdError for ValidationError {}

/// Database operation errors
#[derive(Debug)]
pub enum DatabaseError {
    UniqueConstraintViolation(String),
    NotFound(String),
    ConnectionPool(String),
    UnexpectedError(String),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::UniqueConstraintViolation(msg) => {
                write!(f, "Duplicate entry: {}", msg)
            }
            DatabaseError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DatabaseError::ConnectionPool(msg) => write!(f, "Database connection error: {}", msg),
            DatabaseError::UnexpectedError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl StdError for DatabaseError {}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "Invalid config value: {}", msg),
        }
    }
}

impl StdError for ConfigError {}

/// Authentication and authorization outcomes
///
/// Every variant is terminal for the request. Token failures never say
/// whether the signature, encoding or expiry was the problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown identity or wrong password at login
    InvalidCredentials,
    /// Identity exists but is deactivated
    InactiveAccount,
    /// Refresh token failed verification
    InvalidToken,
    /// Refresh token was valid but its subject is gone or deactivated
    UnknownOrInactiveIdentity,
    /// Missing, malformed or unverifiable bearer token
    Unauthenticated,
    /// Authenticated identity lacks the superuser flag
    InsufficientPrivilege,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Incorrect email or password"),
            AuthError::InactiveAccount => write!(f, "Inactive user"),
            AuthError::InvalidToken => write!(f, "Invalid refresh token"),
            AuthError::UnknownOrInactiveIdentity => write!(f, "Invalid token or inactive user"),
            AuthError::Unauthenticated => write!(f, "Could not validate credentials"),
            AuthError::InsufficientPrivilege => {
                write!(f, "The user doesn't have enough privileges")
            }
        }
    }
}

impl StdError for AuthError {}

impl AuthError {
    fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::InactiveAccount => "ACCOUNT_INACTIVE",
            AuthError::InvalidToken => "TOKEN_INVALID",
            AuthError::UnknownOrInactiveIdentity => "IDENTITY_INVALID",
            AuthError::Unauthenticated => "UNAUTHENTICATED",
            AuthError::InsufficientPrivilege => "INSUFFICIENT_PRIVILEGE",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InactiveAccount => StatusCode::BAD_REQUEST,
            AuthError::InsufficientPrivilege => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

/// Central error type that all application errors map to
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Database(DatabaseError),
    Auth(AuthError),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Database(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

impl AppError {
    /// The auth outcome carried by this error, if any
    pub fn auth_error(&self) -> Option<AuthError> {
        match self {
            AppError::Auth(e) => Some(*e),
            _ => None,
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        AppError::Database(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => {
                AppError::Database(DatabaseError::NotFound("Record not found".to_string()))
            }
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                AppError::Database(DatabaseError::UniqueConstraintViolation(
                    "Email or username already registered".to_string(),
                ))
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::Database(DatabaseError::ConnectionPool(err.to_string()))
            }
            _ => AppError::Database(DatabaseError::UnexpectedError(err.to_string())),
        }
    }
}

/// JSON body of every error response
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Correlates the response with the server log line
    pub error_id: String,
    /// Human-readable error message
    pub message: String,
    /// Error code for client-side handling
    pub code: &'static str,
    pub status: u16,
    /// Timestamp when error occurred
    pub timestamp: String,
}

impl AppError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Database(DatabaseError::UniqueConstraintViolation(_)) => "DUPLICATE_ENTRY",
            AppError::Database(DatabaseError::NotFound(_)) => "NOT_FOUND",
            AppError::Database(DatabaseError::ConnectionPool(_)) => "SERVICE_UNAVAILABLE",
            AppError::Database(DatabaseError::UnexpectedError(_)) => "DATABASE_ERROR",
            AppError::Auth(e) => e.code(),
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show a client; server-side details stay in the logs
    fn public_message(&self) -> String {
        match self {
            AppError::Database(DatabaseError::ConnectionPool(_)) => {
                "Database service temporarily unavailable".to_string()
            }
            AppError::Database(DatabaseError::UnexpectedError(_)) => {
                "Database error occurred".to_string()
            }
            AppError::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    fn log(&self, error_id: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(error_id, error = %e, "Validation error");
            }
            AppError::Database(DatabaseError::UniqueConstraintViolation(_)) => {
                tracing::warn!(error_id, error = %self, "Duplicate entry attempt");
            }
            AppError::Database(DatabaseError::NotFound(_)) => {
                tracing::info!(error_id, error = %self, "Record not found");
            }
            AppError::Auth(AuthError::InvalidCredentials) => {
                tracing::warn!(error_id, "Invalid credentials attempt");
            }
            AppError::Auth(e) => {
                tracing::warn!(error_id, code = e.code(), "Authentication error");
            }
            _ => {
                tracing::error!(error_id, error = %self, "Request failed");
            }
        }
    }

    /// Build the response body, tagging it with `error_id`
    pub fn to_response_body(&self, error_id: &str) -> ErrorResponse {
        ErrorResponse {
            error_id: error_id.to_string(),
            message: self.public_message(),
            code: self.code(),
            status: self.status_code().as_u16(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(DatabaseError::UniqueConstraintViolation(_)) => StatusCode::CONFLICT,
            AppError::Database(DatabaseError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Database(DatabaseError::ConnectionPool(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Auth(e) => e.status_code(),
            AppError::Database(DatabaseError::UnexpectedError(_)) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_id = uuid::Uuid::new_v4().to_string();
        self.log(&error_id);

        let mut builder = HttpResponse::build(self.status_code());
        if self.status_code() == StatusCode::UNAUTHORIZED {
            builder.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
        }
        builder.json(self.to_response_body(&error_id))
    }
}

/// Request-scoped context for structured logging in handlers
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub request_id: String,
    pub user_id: Option<String>,
    pub operation: String,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            user_id: None,
            operation: operation.into(),
        }
    }

    pub fn with_user_id(mut self, user_id: String) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::EmptyField("email".to_string());
        assert_eq!(err.to_string(), "email is empty");

        let err = ValidationError::AlreadyExists("username".to_string());
        assert_eq!(
            err.to_string(),
            "The user with this username already exists in the system."
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue("jwt.secret must be at least 32 bytes".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid config value: jwt.secret must be at least 32 bytes"
        );
    }

    #[test]
    fn test_auth_error_conversion() {
        let app_err: AppError = AuthError::InactiveAccount.into();
        assert_eq!(app_err.auth_error(), Some(AuthError::InactiveAccount));

        let app_err: AppError = ValidationError::InvalidFormat("email".to_string()).into();
        assert_eq!(app_err.auth_error(), None);
    }

    #[test]
    fn test_auth_status_codes() {
        let cases = [
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::InactiveAccount, StatusCode::BAD_REQUEST),
            (AuthError::InvalidToken, StatusCode::UNAUTHORIZED),
            (AuthError::UnknownOrInactiveIdentity, StatusCode::UNAUTHORIZED),
            (AuthError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (AuthError::InsufficientPrivilege, StatusCode::FORBIDDEN),
        ];

        for (err, expected) in cases {
            assert_eq!(ResponseError::status_code(&AppError::Auth(err)), expected);
        }
    }

    #[test]
    fn test_unauthorized_response_carries_challenge() {
        let response = ResponseError::error_response(&AppError::Auth(AuthError::Unauthenticated));
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );

        let response =
            ResponseError::error_response(&AppError::Auth(AuthError::InsufficientPrivilege));
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn test_response_body_hides_internal_details() {
        let body = AppError::Internal("pool exhausted at 10.0.0.3".to_string())
            .to_response_body("test-123");

        assert_eq!(body.error_id, "test-123");
        assert_eq!(body.code, "INTERNAL_ERROR");
        assert_eq!(body.status, 500);
        assert_eq!(body.message, "Internal server error");

        let body = AppError::from(ValidationError::AlreadyExists("email".to_string()))
            .to_response_body("test-456");
        assert_eq!(body.status, 400);
        assert_eq!(
            body.message,
            "The user with this email already exists in the system."
        );
    }

    #[test]
    fn test_database_status_codes() {
        let cases = [
            (DatabaseError::UniqueConstraintViolation("x".into()), StatusCode::CONFLICT),
            (DatabaseError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (DatabaseError::ConnectionPool("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (DatabaseError::UnexpectedError("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::Database(err).status_code(), expected);
        }
    }

    #[test]
    fn test_error_context_creation() {
        let ctx = ErrorContext::new("test_operation");
        assert_eq!(ctx.operation, "test_operation");
        assert!(ctx.user_id.is_none());

        let ctx_with_user = ctx.with_user_id("user-123".to_string());
        assert_eq!(ctx_with_user.user_id, Some("user-123".to_string()));
    }
}
