//! Typed error handling for shepherd
//!
//! Callers get a categorised error they can match on instead of a generic
//! `anyhow::Error`, plus a stable error code for user-facing messaging.
//!
//! # Error Categories
//!
//! - [`ValidationError`]: invalid paging, sort, filter or input parameters,
//!   rejected before any backend call
//! - [`FetchError`]: backend read/write failures
//! - [`ConfigError`]: configuration loading and validation
//!
//! # Example
//!
//! ```rust,ignore
//! use shepherd::prelude::*;
//!
//! match service.list_members(&query).await {
//!     Ok(page) => render(page),
//!     Err(ShepherdError::Validation(e)) => show_form_error(e.to_string()),
//!     Err(ShepherdError::Fetch(_)) => show_retry_banner(),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use serde::Serialize;
use thiserror::Error;

/// Result type alias using shepherd's error type.
pub type Result<T> = std::result::Result<T, ShepherdError>;

/// The main error type for shepherd
#[derive(Debug, Error)]
pub enum ShepherdError {
    /// Invalid query or input parameters
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Backend read/write failure
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Internal errors (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Serializable error payload for presentation layers
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

impl ShepherdError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ShepherdError::Validation(e) => e.error_code(),
            ShepherdError::Fetch(e) => e.error_code(),
            ShepherdError::Config(_) => "CONFIG_ERROR",
            ShepherdError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether a caller may reasonably offer a retry affordance
    pub fn is_retryable(&self) -> bool {
        matches!(self, ShepherdError::Fetch(e) if !matches!(e, FetchError::Decode { .. }))
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
            ShepherdError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            ShepherdError::Validation(ValidationError::UnknownSortField { record, field })
            | ShepherdError::Validation(ValidationError::UnknownFilterField { record, field }) => {
                Some(serde_json::json!({ "record": record, "field": field }))
            }
            ShepherdError::Fetch(FetchError::Status { table, status, .. }) => {
                Some(serde_json::json!({ "table": table, "status": status }))
            }
            _ => None,
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors raised before a query or write reaches the data provider
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Page numbers start at 1
    #[error("Invalid page {page}: pages start at 1")]
    InvalidPage { page: usize },

    /// Page size must be positive
    #[error("Invalid page size {page_size}: must be at least 1")]
    InvalidPageSize { page_size: usize },

    /// Sort field is not sortable for this record type
    #[error("Unknown sort field '{field}' for {record}")]
    UnknownSortField { record: String, field: String },

    /// Filter or range field is not filterable for this record type
    #[error("Unknown filter field '{field}' for {record}")]
    UnknownFilterField { record: String, field: String },

    /// Range bound cannot be read as the field's type
    #[error("Invalid bound '{value}' for range field '{field}'")]
    InvalidRangeBound { field: String, value: String },

    /// One or more input fields failed validation
    #[error("Validation errors: {}", join_field_errors(.0))]
    FieldErrors(Vec<FieldValidationError>),
}

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl FieldValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn join_field_errors(errors: &[FieldValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::InvalidPage { .. } => "INVALID_PAGE",
            ValidationError::InvalidPageSize { .. } => "INVALID_PAGE_SIZE",
            ValidationError::UnknownSortField { .. } => "UNKNOWN_SORT_FIELD",
            ValidationError::UnknownFilterField { .. } => "UNKNOWN_FILTER_FIELD",
            ValidationError::InvalidRangeBound { .. } => "INVALID_RANGE_BOUND",
            ValidationError::FieldErrors(_) => "VALIDATION_ERROR",
        }
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldValidationError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    FieldValidationError::new(field.to_string(), message)
                })
            })
            .collect();
        // HashMap iteration order is unstable
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ValidationError::FieldErrors(fields)
    }
}

// =============================================================================
// Fetch Errors
// =============================================================================

/// Errors raised by data providers
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a response (connection, timeout, TLS)
    #[error("Request to '{table}' failed: {message}")]
    Http { table: String, message: String },

    /// The backend answered with a non-success status
    #[error("Backend rejected request to '{table}' with status {status}: {message}")]
    Status {
        table: String,
        status: u16,
        message: String,
    },

    /// The response body did not match the expected row shape
    #[error("Failed to decode '{table}' rows: {message}")]
    Decode { table: String, message: String },

    /// An insert succeeded but returned no representation
    #[error("Insert into '{table}' returned no row")]
    EmptyInsert { table: String },

    /// The in-memory fixture store could not be accessed
    #[error("Fixture store unavailable: {message}")]
    Store { message: String },
}

impl FetchError {
    pub fn error_code(&self) -> &'static str {
        match self {
            FetchError::Http { .. } => "FETCH_HTTP_ERROR",
            FetchError::Status { .. } => "FETCH_STATUS_ERROR",
            FetchError::Decode { .. } => "FETCH_DECODE_ERROR",
            FetchError::EmptyInsert { .. } => "FETCH_EMPTY_INSERT",
            FetchError::Store { .. } => "FETCH_STORE_ERROR",
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration
    #[error("{}", parse_error_message(.file, .message))]
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// A required component was not supplied
    #[error("Missing required field '{field}' in {context}")]
    MissingField { field: String, context: String },

    /// IO error while reading configuration
    #[error("IO error reading '{path}': {message}")]
    IoError { path: String, message: String },
}

fn parse_error_message(file: &Option<String>, message: &str) -> String {
    match file {
        Some(file) => format!("Failed to parse config file '{}': {}", file, message),
        None => format!("Failed to parse config: {}", message),
    }
}
