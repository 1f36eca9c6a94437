//! Error types for crate design and STEP parsing
//!
//! This module provides the error type shared by every stage of the engine.
//! All errors include error codes for categorization and a message naming the
//! offending field or file.
//!
//! # Error Codes
//!
//! Error codes follow the pattern: `E<category><number>`
//!
//! Categories:
//! - **E1xxx**: I/O and file discovery errors
//! - **E2xxx**: Serialization errors
//! - **E3xxx**: Configuration, parsing and geometry errors
//!
//! ## Common Error Codes
//!
//! - `E1001`: I/O error reading a file
//! - `E1002`: Directory traversal error
//! - `E1003`: No STEP files found
//! - `E2001`: JSON (de)serialization error
//! - `E3001`: Invalid crate configuration
//! - `E3002`: Parse error (numbers, STEP entities)
//! - `E3003`: Invalid assembled geometry

use std::io;
use thiserror::Error;

/// Result type for crate design operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while designing a crate or reading CAD files
#[derive(Error, Debug)]
pub enum Error {
    /// IO error occurred while reading a file
    ///
    /// **Error Code**: E1001
    ///
    /// **Common Causes**:
    /// - File not found
    /// - Insufficient permissions
    #[error("[E1001] I/O error: {0}")]
    Io(#[from] io::Error),

    /// Directory traversal error while scanning for STEP files
    ///
    /// **Error Code**: E1002
    ///
    /// **Common Causes**:
    /// - Directory removed during the scan
    /// - Symlink loop
    #[cfg(feature = "catalog")]
    #[error("[E1002] Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// No STEP files were found where at least one was expected
    ///
    /// **Error Code**: E1003
    ///
    /// **Suggestions**:
    /// - Check the directory path
    /// - Only `.stp` and `.step` files are considered
    #[error("[E1003] No STEP files found in '{0}'")]
    NoStepFiles(String),

    /// JSON serialization or deserialization error
    ///
    /// **Error Code**: E2001
    ///
    /// **Common Causes**:
    /// - Malformed configuration JSON
    /// - Wrong value type for a field (e.g. a string where a number is expected)
    #[error("[E2001] JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid crate configuration
    ///
    /// **Error Code**: E3001
    ///
    /// **Common Causes**:
    /// - Zero, negative or NaN dimensions
    /// - Zero or negative weights
    /// - Crate too small to hold the base, top panel and perimeter cleats
    ///
    /// **Suggestions**:
    /// - All lengths are inches and must be positive
    /// - Increase the crate height so the walls clear the skids and top panel
    #[error("[E3001] Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Parse error for numeric values or STEP entities
    ///
    /// **Error Code**: E3002
    ///
    /// **Common Causes**:
    /// - Invalid number format
    /// - STEP text without any CARTESIAN_POINT entity
    #[error("[E3002] Parse error: {0}")]
    ParseError(String),

    /// Assembled geometry cannot be used
    ///
    /// **Error Code**: E3003
    ///
    /// **Common Causes**:
    /// - Bounding box requested for an empty scene
    #[error("[E3003] Invalid geometry: {0}")]
    InvalidGeometry(String),
}

impl From<std::num::ParseFloatError> for Error {
    fn from(err: std::num::ParseFloatError) -> Self {
        Error::ParseError(format!("Failed to parse floating-point number: {}", err))
    }
}

impl Error {
    /// Create an InvalidConfiguration error for a value that must be a positive number
    ///
    /// # Arguments
    /// * `field` - The configuration field (e.g., "dimensions.length")
    /// * `value` - The rejected value
    pub fn invalid_dimension(field: &str, value: f64) -> Self {
        Error::InvalidConfiguration(format!(
            "'{}' must be a positive finite number, got {}",
            field, value
        ))
    }

    /// Create a ParseError with context about what was being parsed
    ///
    /// # Arguments
    /// * `field_name` - The name of the field being parsed (e.g., "CARTESIAN_POINT x")
    /// * `value` - The value that failed to parse
    /// * `expected_type` - The expected type (e.g., "STEP real")
    pub fn parse_error_with_context(field_name: &str, value: &str, expected_type: &str) -> Self {
        Error::ParseError(format!(
            "Failed to parse '{}': expected {}, got '{}'. \
             Verify the value is properly formatted.",
            field_name, expected_type, value
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_in_messages() {
        let io_err = Error::Io(io::Error::new(io::ErrorKind::NotFound, "test"));
        assert!(io_err.to_string().contains("[E1001]"));

        let no_files = Error::NoStepFiles("cad".to_string());
        assert!(no_files.to_string().contains("[E1003]"));
        assert!(no_files.to_string().contains("'cad'"));

        let invalid = Error::InvalidConfiguration("test".to_string());
        assert!(invalid.to_string().contains("[E3001]"));

        let parse_err = Error::ParseError("test".to_string());
        assert!(parse_err.to_string().contains("[E3002]"));

        let geometry = Error::InvalidGeometry("empty".to_string());
        assert!(geometry.to_string().contains("[E3003]"));
    }

    #[test]
    fn test_invalid_dimension_helper() {
        let err = Error::invalid_dimension("dimensions.width", -4.0);
        assert!(err.to_string().contains("dimensions.width"));
        assert!(err.to_string().contains("-4"));
        assert!(err.to_string().contains("[E3001]"));
    }

    #[test]
    fn test_parse_error_with_context_helper() {
        let err = Error::parse_error_with_context("CARTESIAN_POINT x", "abc", "STEP real");
        assert!(err.to_string().contains("CARTESIAN_POINT x"));
        assert!(err.to_string().contains("STEP real"));
        assert!(err.to_string().contains("'abc'"));
        assert!(err.to_string().contains("[E3002]"));
    }

    #[test]
    fn test_parse_float_error_conversion() {
        let parse_err: std::num::ParseFloatError = "not_a_number".parse::<f64>().unwrap_err();
        let err = Error::from(parse_err);
        assert!(err
            .to_string()
            .contains("Failed to parse floating-point number"));
        assert!(err.to_string().contains("[E3002]"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::from(json_err);
        assert!(err.to_string().contains("[E2001]"));
    }
}
