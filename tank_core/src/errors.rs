//! # Error Types
//!
//! Structured error types for tank_core. Calculation errors fall into two
//! families: invalid input (always the caller's problem, never retried) and
//! numeric degeneracy (the inputs were well-formed but the math broke down).
//! Report adapters map both onto HTTP-style status codes.
//!
//! ## Example
//!
//! ```rust
//! use tank_core::errors::{CalcError, CalcResult};
//!
//! fn validate_pressure(pressure_bar: f64) -> CalcResult<()> {
//!     if pressure_bar < 0.0 {
//!         return Err(CalcError::InvalidInput {
//!             field: "pressure_bar".to_string(),
//!             value: pressure_bar.to_string(),
//!             reason: "Pressure must not be negative".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for tank_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculation operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, non-physical, missing layers, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Inputs were accepted but the computation degenerated
    /// (near-zero thickness, zero stiffness, non-convergent burst search)
    #[error("Numeric degeneracy in {operation}: {reason}")]
    NumericDegeneracy { operation: String, reason: String },

    /// Material id not present in the registry
    #[error("Material not found: {material_id}")]
    MaterialNotFound { material_id: String },

    /// Design id not present in the catalog
    #[error("Design not found: {design_id}")]
    DesignNotFound { design_id: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON/TOML serialization or deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Analysis configuration rejected
    #[error("Invalid configuration '{key}': {reason}")]
    ConfigError { key: String, reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// A sampling run was abandoned by its caller
    #[error("Run cancelled: {operation}")]
    Cancelled { operation: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
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

    /// Create a NumericDegeneracy error
    pub fn numeric_degeneracy(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::NumericDegeneracy {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create a MaterialNotFound error
    pub fn material_not_found(material_id: impl Into<String>) -> Self {
        CalcError::MaterialNotFound {
            material_id: material_id.into(),
        }
    }

    /// Create a DesignNotFound error
    pub fn design_not_found(design_id: impl Into<String>) -> Self {
        CalcError::DesignNotFound {
            design_id: design_id.into(),
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

    /// Create a ConfigError
    pub fn config_error(key: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::ConfigError {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Calculations are deterministic, so nothing is worth retrying.
    pub fn is_recoverable(&self) -> bool {
        false
    }

    /// True for errors caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CalcError::InvalidInput { .. }
                | CalcError::MaterialNotFound { .. }
                | CalcError::DesignNotFound { .. }
                | CalcError::ConfigError { .. }
                | CalcError::VersionMismatch { .. }
        )
    }

    /// HTTP status a request handler should answer with
    pub fn http_status(&self) -> u16 {
        match self {
            CalcError::InvalidInput { .. }
            | CalcError::ConfigError { .. }
            | CalcError::VersionMismatch { .. } => 400,
            CalcError::MaterialNotFound { .. } | CalcError::DesignNotFound { .. } => 404,
            CalcError::Cancelled { .. } => 499,
            CalcError::NumericDegeneracy { .. }
            | CalcError::FileError { .. }
            | CalcError::SerializationError { .. }
            | CalcError::Internal { .. } => 500,
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::NumericDegeneracy { .. } => "NUMERIC_DEGENERACY",
            CalcError::MaterialNotFound { .. } => "MATERIAL_NOT_FOUND",
            CalcError::DesignNotFound { .. } => "DESIGN_NOT_FOUND",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::ConfigError { .. } => "CONFIG_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
            CalcError::Cancelled { .. } => "CANCELLED",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

/// Reject NaN and infinities before they reach a formula.
pub(crate) fn require_finite(field: &str, value: f64) -> CalcResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CalcError::invalid_input(field, value.to_string(), "Value must be finite"))
    }
}

/// Require a strictly positive, finite value.
pub(crate) fn require_positive(field: &str, value: f64) -> CalcResult<()> {
    require_finite(field, value)?;
    if value <= 0.0 {
        return Err(CalcError::invalid_input(field, value.to_string(), "Value must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::invalid_input("pressure_bar", "-5.0", "Pressure must not be negative");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::material_not_found("T700S").error_code(), "MATERIAL_NOT_FOUND");
        assert_eq!(
            CalcError::numeric_degeneracy("burst search", "no bracket").error_code(),
            "NUMERIC_DEGENERACY"
        );
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(CalcError::invalid_input("layers", "[]", "empty").http_status(), 400);
        assert_eq!(CalcError::design_not_found("x").http_status(), 404);
        assert_eq!(CalcError::numeric_degeneracy("solver", "zero stiffness").http_status(), 500);
        assert!(CalcError::invalid_input("a", "b", "c").is_client_error());
        assert!(!CalcError::numeric_degeneracy("a", "b").is_client_error());
    }

    #[test]
    fn test_nothing_is_recoverable() {
        assert!(!CalcError::numeric_degeneracy("a", "b").is_recoverable());
        assert!(!CalcError::invalid_input("a", "b", "c").is_recoverable());
    }

    #[test]
    fn test_require_helpers() {
        assert!(require_finite("x", 1.0).is_ok());
        assert!(require_finite("x", f64::NAN).is_err());
        assert!(require_positive("x", 0.0).is_err());
        assert!(require_positive("x", f64::INFINITY).is_err());
        assert!(require_positive("x", 2.0).is_ok());
    }
}
