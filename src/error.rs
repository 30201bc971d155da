//! Error types for acts
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad input, unknown activity, ambiguous id)
//! - 4: Operation failed (I/O, serialization)

use thiserror::Error;

/// Exit codes for the acts CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for acts operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Malformed timestamp: {0}")]
    MalformedTimestamp(String),

    #[error("No activities found with index {0}")]
    NoSuchActivity(String),

    #[error("Ambiguous ID {id} matches {} activities:\n{}", .candidates.len(), .candidates.join("\n"))]
    AmbiguousIdentifier { id: String, candidates: Vec<String> },

    #[error("Unit '{0}' not found. Legal units are 'month','week','day','hour','minute'")]
    UnknownUnit(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    // Recovered locally during replay; only surfaces when decoding a single line
    #[error("Could not match log line: {0}")]
    UnparseableLogLine(String),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::MalformedTimestamp(_)
            | Error::NoSuchActivity(_)
            | Error::AmbiguousIdentifier { .. }
            | Error::UnknownUnit(_)
            | Error::InvalidArgument(_)
            | Error::InvalidConfig(_)
            | Error::InvalidPattern(_)
            | Error::UnparseableLogLine(_) => exit_codes::USER_ERROR,

            Error::Io(_) | Error::Json(_) | Error::TomlParse(_) | Error::TomlSerialize(_) => {
                exit_codes::OPERATION_FAILED
            }
        }
    }

    /// Coarse error class for machine-readable output
    pub fn kind(&self) -> &'static str {
        match self.exit_code() {
            exit_codes::USER_ERROR => "user_error",
            _ => "operation_failed",
        }
    }

    /// Structured details for machine-readable error output
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::AmbiguousIdentifier { id, candidates } => Some(serde_json::json!({
                "id": id,
                "candidates": candidates,
            })),
            Error::NoSuchActivity(id) => Some(serde_json::json!({ "id": id })),
            Error::UnknownUnit(unit) => Some(serde_json::json!({ "unit": unit })),
            _ => None,
        }
    }
}

/// Result type alias for acts operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub message: String,
    pub code: i32,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            message: err.to_string(),
            code: err.exit_code(),
            kind: err.kind(),
            details: err.details(),
        }
    }
}
