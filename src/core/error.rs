//! Typed error handling for request validation
//!
//! # Error Categories
//!
//! - [`ValidationRejection`]: What a [`Schema`](crate::core::Schema) returns when it refuses a value
//! - [`ValidationError`]: The default error kind handed to the pipeline on failure
//! - [`ConfigError`]: Errors raised while loading schemas and options from YAML
//! - [`RequestError`]: Errors raised by the axum adapter before validation starts
//!
//! The error kind delivered to the pipeline is pluggable through [`ErrorFactory`]:
//!
//! ```rust,ignore
//! #[derive(Debug)]
//! struct BadInput(String);
//!
//! let options = ValidationOptions::new().error_factory(error_factory_fn(BadInput));
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// Separator used when a rejection carries several messages
pub const MESSAGE_SEPARATOR: &str = ",";

/// The main error type of the crate
#[derive(Debug)]
pub enum ThisError {
    /// Input did not satisfy its schema
    Validation(ValidationError),

    /// Configuration errors
    Config(ConfigError),

    /// HTTP/Request errors
    Request(RequestError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for ThisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThisError::Validation(e) => write!(f, "{}", e),
            ThisError::Config(e) => write!(f, "{}", e),
            ThisError::Request(e) => write!(f, "{}", e),
            ThisError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ThisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ThisError::Validation(e) => Some(e),
            ThisError::Config(e) => Some(e),
            ThisError::Request(e) => Some(e),
            ThisError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ThisError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ThisError::Validation(e) => e.status_code(),
            ThisError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ThisError::Request(e) => e.status_code(),
            ThisError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ThisError::Validation(e) => e.error_code(),
            ThisError::Config(_) => "CONFIG_ERROR",
            ThisError::Request(e) => e.error_code(),
            ThisError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ThisError::Request(RequestError::InvalidJson { message }) => {
                Some(serde_json::json!({ "error": "Invalid JSON", "details": message }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for ThisError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Schema Rejection
// =============================================================================

/// Rejection produced by a schema
///
/// `errors` is ordered and expected to be non-empty. An empty list is out of
/// contract; the handler still takes the failure path with an empty message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .errors.join(MESSAGE_SEPARATOR))]
pub struct ValidationRejection {
    pub errors: Vec<String>,
}

impl ValidationRejection {
    pub fn new(errors: Vec<String>) -> Self {
        Self { errors }
    }

    /// Rejection carrying a single message
    pub fn single(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
        }
    }

    /// All messages joined into one string
    pub fn joined(&self) -> String {
        self.errors.join(MESSAGE_SEPARATOR)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Default error kind delivered to the pipeline when validation fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    pub fn error_code(&self) -> &'static str {
        "VALIDATION_ERROR"
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for ThisError {
    fn from(err: ValidationError) -> Self {
        ThisError::Validation(err)
    }
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        ThisError::from(self).into_response()
    }
}

// =============================================================================
// Error Factories
// =============================================================================

/// Builds the pipeline's error value from a joined rejection message
pub trait ErrorFactory: Send + Sync + 'static {
    type Error: Send + 'static;

    fn from_message(&self, message: String) -> Self::Error;
}

/// Factory producing [`ValidationError`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorFactory;

impl ErrorFactory for DefaultErrorFactory {
    type Error = ValidationError;

    fn from_message(&self, message: String) -> ValidationError {
        ValidationError::new(message)
    }
}

/// Factory backed by a closure, see [`error_factory_fn`]
#[derive(Clone, Copy)]
pub struct FromFn<F>(F);

impl<F> fmt::Debug for FromFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FromFn").finish()
    }
}

/// Use a `Fn(String) -> E` as an [`ErrorFactory`]
///
/// Tuple-struct constructors work directly: `error_factory_fn(MyError)`.
pub fn error_factory_fn<F, E>(f: F) -> FromFn<F>
where
    F: Fn(String) -> E + Send + Sync + 'static,
    E: Send + 'static,
{
    FromFn(f)
}

impl<F, E> ErrorFactory for FromFn<F>
where
    F: Fn(String) -> E + Send + Sync + 'static,
    E: Send + 'static,
{
    type Error = E;

    fn from_message(&self, message: String) -> E {
        (self.0)(message)
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors related to configuration loading
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse configuration
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid configuration value
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// IO error reading configuration
    IoError { path: String, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for config field '{}': {}",
                    value, field, message
                )
            }
            ConfigError::IoError { path, message } => {
                write!(f, "Failed to read config file '{}': {}", path, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for ThisError {
    fn from(err: ConfigError) -> Self {
        ThisError::Config(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors raised while reading an HTTP request, before validation runs
#[derive(Debug)]
pub enum RequestError {
    /// Body could not be read
    InvalidBody { message: String },

    /// Body is not valid JSON
    InvalidJson { message: String },

    /// Query string could not be decoded
    InvalidQuery { message: String },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::InvalidBody { message } => {
                write!(f, "Invalid request body: {}", message)
            }
            RequestError::InvalidJson { message } => {
                write!(f, "Invalid JSON: {}", message)
            }
            RequestError::InvalidQuery { message } => {
                write!(f, "Invalid query string: {}", message)
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidBody { .. } => "INVALID_BODY",
            RequestError::InvalidJson { .. } => "INVALID_JSON",
            RequestError::InvalidQuery { .. } => "INVALID_QUERY",
        }
    }
}

impl From<RequestError> for ThisError {
    fn from(err: RequestError) -> Self {
        ThisError::Request(err)
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        ThisError::from(self).into_response()
    }
}
