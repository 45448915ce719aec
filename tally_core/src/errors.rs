//! # Error Types
//!
//! Structured error types for tally_core. The engine itself is pure arithmetic,
//! so errors only surface at two boundaries:
//!
//! - the input boundary, where a presentation layer hands over field values
//!   that do not match the domain's schema;
//! - the configuration boundary, where a domain definition is incomplete
//!   (for example a choice option with no lookup-table entry).
//!
//! Degenerate inputs (zero dimensions) and out-of-range values are never
//! errors. They flow through to zero results or advisories.
//!
//! ## Example
//!
//! ```rust
//! use tally_core::errors::{CalcError, CalcResult};
//!
//! fn check_depth(depth_in: f64) -> CalcResult<()> {
//!     if !depth_in.is_finite() {
//!         return Err(CalcError::invalid_input(
//!             "depth",
//!             depth_in.to_string(),
//!             "Depth must be a finite number",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_depth(f64::NAN).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for tally_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for estimation operations.
///
/// Each variant provides specific context about what went wrong,
/// enabling programmatic error handling by front ends and scripts.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (non-finite, wrong shape)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// The field is not declared by the domain's schema
    #[error("Unknown field '{field}' for domain '{domain}'")]
    UnknownField { domain: String, field: String },

    /// The value kind does not match the declared field kind
    #[error("Field '{field}' expects a {expected} value, got {found}")]
    FieldTypeMismatch {
        field: String,
        expected: String,
        found: String,
    },

    /// An enumerated value is not a member of the field's declared options
    #[error("Invalid choice for '{field}': '{value}' (expected one of: {allowed})")]
    InvalidChoice {
        field: String,
        value: String,
        allowed: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// A lookup table has no entry for an enumerated value
    #[error("Lookup table '{table}' has no entry for '{key}'")]
    MissingTableEntry { table: String, key: String },

    /// Domain configuration is malformed
    #[error("Invalid configuration for domain '{domain}': {reason}")]
    InvalidConfig { domain: String, reason: String },

    /// No built-in domain with this name
    #[error("Unknown domain: {name}")]
    UnknownDomain { name: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an UnknownField error
    pub fn unknown_field(domain: impl Into<String>, field: impl Into<String>) -> Self {
        CalcError::UnknownField {
            domain: domain.into(),
            field: field.into(),
        }
    }

    /// Create a FieldTypeMismatch error
    pub fn type_mismatch(field: impl Into<String>, expected: impl Into<String>, found: impl Into<String>) -> Self {
        CalcError::FieldTypeMismatch {
            field: field.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an InvalidChoice error
    pub fn invalid_choice(field: impl Into<String>, value: impl Into<String>, allowed: &[String]) -> Self {
        CalcError::InvalidChoice {
            field: field.into(),
            value: value.into(),
            allowed: allowed.join(", "),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create a MissingTableEntry error
    pub fn missing_table_entry(table: impl Into<String>, key: impl Into<String>) -> Self {
        CalcError::MissingTableEntry {
            table: table.into(),
            key: key.into(),
        }
    }

    /// Create an InvalidConfig error
    pub fn invalid_config(domain: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidConfig {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by the caller's input rather than the domain definition
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CalcError::InvalidInput { .. }
                | CalcError::UnknownField { .. }
                | CalcError::FieldTypeMismatch { .. }
                | CalcError::InvalidChoice { .. }
                | CalcError::MissingField { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::UnknownField { .. } => "UNKNOWN_FIELD",
            CalcError::FieldTypeMismatch { .. } => "FIELD_TYPE_MISMATCH",
            CalcError::InvalidChoice { .. } => "INVALID_CHOICE",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::MissingTableEntry { .. } => "MISSING_TABLE_ENTRY",
            CalcError::InvalidConfig { .. } => "INVALID_CONFIG",
            CalcError::UnknownDomain { .. } => "UNKNOWN_DOMAIN",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(err: serde_json::Error) -> Self {
        CalcError::SerializationError {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::invalid_choice("region", "Mars", &["Northeast".to_string(), "South".to_string()]);
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidChoice\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::missing_field("depth").error_code(), "MISSING_FIELD");
        assert_eq!(
            CalcError::missing_table_entry("region", "Mars").error_code(),
            "MISSING_TABLE_ENTRY"
        );
    }

    #[test]
    fn test_input_errors_are_classified() {
        assert!(CalcError::unknown_field("paving", "color").is_input_error());
        assert!(!CalcError::invalid_config("paving", "empty table").is_input_error());
    }

    #[test]
    fn test_choice_message_lists_options() {
        let error = CalcError::invalid_choice("season", "Monsoon", &["Spring".to_string(), "Fall".to_string()]);
        assert_eq!(
            error.to_string(),
            "Invalid choice for 'season': 'Monsoon' (expected one of: Spring, Fall)"
        );
    }
}
