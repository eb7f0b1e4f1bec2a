//! Structured Error Handling for stresscast
//!
//! Provides a unified error type hierarchy with:
//! - Error codes for programmatic handling
//! - Structured error responses (JSON-friendly)
//! - Context preservation through error chains
//! - HTTP status code mapping
//!
//! # Error Categories
//!
//! - `ValidationError` - Input record validation failures
//! - `UnknownCategory` - Categorical value outside a frozen vocabulary
//! - `ArtifactError` - Model artifact loading/compatibility failures
//! - `PredictionFailed` - Classifier failures during inference
//! - `ConfigError` - Configuration issues
//!
//! # Example
//!
//! ```rust,ignore
//! use stresscast::error::{StressError, ErrorCode};
//!
//! fn check_age(age: Option<f64>) -> Result<f64, StressError> {
//!     age.ok_or_else(|| StressError::missing_field("Age"))
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use serde::{Deserialize, Serialize};

// ============================================================================
// Error Codes
// ============================================================================

/// Unique error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    /// Generic validation error
    ValidationError = 1000,
    /// Missing required field
    MissingRequired = 1001,
    /// Invalid value
    InvalidValue = 1002,
    /// Empty input
    EmptyInput = 1003,

    // Encoding errors (2xxx)
    /// Categorical value not in the frozen vocabulary
    UnknownCategory = 2000,
    /// No encoder registered for the column
    UnknownColumn = 2001,
    /// Label id outside the frozen vocabulary
    UnknownLabelId = 2002,

    // Artifact errors (3xxx)
    /// Generic artifact error
    ArtifactError = 3000,
    /// Artifact file not found
    ArtifactNotFound = 3001,
    /// Artifact could not be deserialized
    CorruptArtifact = 3002,
    /// Trained column signature mismatch
    ColumnMismatch = 3003,

    // Prediction errors (4xxx)
    /// Classifier failed during inference
    PredictionFailed = 4000,
    /// Feature vector length does not match the trained columns
    FeatureCountMismatch = 4001,

    // Config errors (5xxx)
    /// Generic config error
    ConfigError = 5000,
    /// Config file not found
    ConfigNotFound = 5001,
    /// Invalid config syntax
    InvalidConfigSyntax = 5002,
    /// Invalid config value
    InvalidConfigValue = 5003,

    // Internal errors (9xxx)
    /// Internal error
    InternalError = 9000,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a short description of the error code
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "Validation error",
            ErrorCode::MissingRequired => "Missing required field",
            ErrorCode::InvalidValue => "Invalid value",
            ErrorCode::EmptyInput => "Empty input",

            ErrorCode::UnknownCategory => "Unknown category value",
            ErrorCode::UnknownColumn => "No encoder for column",
            ErrorCode::UnknownLabelId => "Unknown label id",

            ErrorCode::ArtifactError => "Artifact error",
            ErrorCode::ArtifactNotFound => "Artifact file not found",
            ErrorCode::CorruptArtifact => "Artifact could not be deserialized",
            ErrorCode::ColumnMismatch => "Trained column signature mismatch",

            ErrorCode::PredictionFailed => "Prediction failed",
            ErrorCode::FeatureCountMismatch => "Feature count mismatch",

            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::ConfigNotFound => "Configuration file not found",
            ErrorCode::InvalidConfigSyntax => "Invalid configuration syntax",
            ErrorCode::InvalidConfigValue => "Invalid configuration value",

            ErrorCode::InternalError => "Internal error",
        }
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> u16 {
        match self {
            // Client errors -> 400 Bad Request
            ErrorCode::ValidationError
            | ErrorCode::MissingRequired
            | ErrorCode::InvalidValue
            | ErrorCode::EmptyInput
            | ErrorCode::UnknownCategory => 400,

            // Not found
            ErrorCode::ConfigNotFound => 404,

            // Server-side failures
            ErrorCode::UnknownColumn
            | ErrorCode::UnknownLabelId
            | ErrorCode::ArtifactError
            | ErrorCode::ArtifactNotFound
            | ErrorCode::CorruptArtifact
            | ErrorCode::ColumnMismatch
            | ErrorCode::PredictionFailed
            | ErrorCode::FeatureCountMismatch
            | ErrorCode::ConfigError
            | ErrorCode::InvalidConfigSyntax
            | ErrorCode::InvalidConfigValue
            | ErrorCode::InternalError => 500,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

// ============================================================================
// Error Context
// ============================================================================

/// Additional context information for an error
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Key-value pairs of context information
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub fields: HashMap<String, String>,
    /// Stack of error causes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl ErrorContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field to the context
    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Add a cause to the error chain
    pub fn cause(mut self, cause: impl Into<String>) -> Self {
        self.causes.push(cause.into());
        self
    }
}

// ============================================================================
// Main Error Type
// ============================================================================

/// The main error type for stresscast
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressError {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,
    /// Hint for resolving the error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl StressError {
    /// Create a new error with a code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            hint: None,
        }
    }

    // ========================================================================
    // Factory methods for common error types
    // ========================================================================

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    /// Create a missing-field error
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingRequired,
            format!("Required field '{}' is missing", field),
        )
    }

    /// Create an invalid-value error
    pub fn invalid_value(field: &str, value: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidValue,
            format!("Invalid value '{}' for field '{}'", value, field),
        )
        .with_context("field", field)
    }

    /// Create an unknown-category error
    pub fn unknown_category(column: &str, value: &str) -> Self {
        Self::new(
            ErrorCode::UnknownCategory,
            format!(
                "Value '{}' is not in the vocabulary of column '{}'",
                value, column
            ),
        )
        .with_context("column", column)
        .with_context("value", value)
    }

    /// Create an unknown-column error
    pub fn unknown_column(column: &str) -> Self {
        Self::new(
            ErrorCode::UnknownColumn,
            format!("No encoder registered for column '{}'", column),
        )
    }

    /// Create an artifact error
    pub fn artifact(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ArtifactError, message)
    }

    /// Create a column-mismatch error
    pub fn column_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ColumnMismatch, message)
    }

    /// Create a prediction error
    pub fn prediction(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PredictionFailed, message)
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Set the error code
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = code;
        self
    }

    /// Add context to the error
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::new);
        ctx.fields.insert(key.into(), value.into());
        self
    }

    /// Add a cause to the error chain
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::new);
        ctx.causes.push(cause.into());
        self
    }

    /// Add a hint for resolving the error
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        let status = self.http_status();
        (400..500).contains(&status)
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        let status = self.http_status();
        (500..600).contains(&status)
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":"INTERNAL_ERROR","message":"{}"}}"#, self.message)
        })
    }
}

impl fmt::Display for StressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)?;

        if let Some(ref ctx) = self.context {
            if !ctx.causes.is_empty() {
                write!(f, "\nCaused by:")?;
                for cause in &ctx.causes {
                    write!(f, "\n  - {}", cause)?;
                }
            }
        }

        if let Some(ref hint) = self.hint {
            write!(f, "\nHint: {}", hint)?;
        }

        Ok(())
    }
}

impl std::error::Error for StressError {}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<std::io::Error> for StressError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;
        let code = match err.kind() {
            ErrorKind::NotFound => ErrorCode::ArtifactNotFound,
            _ => ErrorCode::InternalError,
        };
        StressError::new(code, err.to_string())
    }
}

impl From<serde_json::Error> for StressError {
    fn from(err: serde_json::Error) -> Self {
        StressError::new(ErrorCode::CorruptArtifact, err.to_string())
            .with_context("format", "JSON")
    }
}

impl From<toml::de::Error> for StressError {
    fn from(err: toml::de::Error) -> Self {
        StressError::config(err.to_string()).with_code(ErrorCode::InvalidConfigSyntax)
    }
}

// ============================================================================
// Result type alias
// ============================================================================

/// A Result type using StressError
pub type StressResult<T> = Result<T, StressError>;

// ============================================================================
// Error response for HTTP APIs
// ============================================================================

/// Structured error response for HTTP APIs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error indicator
    pub error: bool,
    /// Error code (string form)
    pub code: String,
    /// Numeric error code
    pub code_num: u32,
    /// HTTP status code
    pub status: u16,
    /// Error message
    pub message: String,
    /// Additional details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, String>>,
    /// Hint for resolution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl From<&StressError> for ErrorResponse {
    fn from(err: &StressError) -> Self {
        Self {
            error: true,
            code: format!("{:?}", err.code),
            code_num: err.code.code(),
            status: err.http_status(),
            message: err.message.clone(),
            details: err.context.as_ref().map(|c| c.fields.clone()),
            hint: err.hint.clone(),
        }
    }
}

impl From<StressError> for ErrorResponse {
    fn from(err: StressError) -> Self {
        Self::from(&err)
    }
}

// ============================================================================
// Tests
// ============================================================================
