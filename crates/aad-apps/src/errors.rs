//! # Error Types
//!
//! All error types for application building.

use aad_teal::{CompileError, TealType};
use thiserror::Error;

// =============================================================================
// APP ERRORS
// =============================================================================

/// Errors raised while declaring state or assembling an application.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Access to a key the state does not declare.
    #[error("unknown state key: {key}")]
    UnknownKey { key: String },

    /// A value or default whose type disagrees with the declared key type.
    #[error("type mismatch for key {key}: expected {expected}, got {actual}")]
    TypeMismatch {
        key: String,
        expected: TealType,
        actual: TealType,
    },

    /// Declared state exceeds what the platform allows.
    #[error("{store} schema overflow: {entries} entries > {max}")]
    SchemaOverflow {
        store: &'static str,
        entries: u64,
        max: u64,
    },

    /// Two handlers registered under the same invocation name.
    #[error("duplicate invocation: {name}")]
    DuplicateInvocation { name: String },

    /// Two keys with the same bytes in one state.
    #[error("duplicate state key: {key}")]
    DuplicateKey { key: String },

    /// A key that is too long, or declared with a non-value type.
    #[error("invalid state key {key}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// A write through state the current app cannot modify.
    #[error("state is read-only: cannot modify key {key}")]
    ReadOnlyState { key: String },

    /// A transaction result without the expected fields.
    #[error("malformed result: {0}")]
    MalformedResult(String),

    /// Program compilation to TEAL source failed.
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    /// A collaborator failed; its error is passed through untouched.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

// =============================================================================
// SERVICE ERRORS
// =============================================================================

/// Errors reported by the node-facing collaborators.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The node rejected the program source.
    #[error("compilation failed: {0}")]
    Compile(String),

    /// No application with this id exists.
    #[error("application not found: {0}")]
    ApplicationNotFound(u64),

    /// The node could not be reached.
    #[error("node unavailable: {0}")]
    Unavailable(String),

    /// Any other collaborator failure.
    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::TypeMismatch {
            key: "counter".into(),
            expected: TealType::Uint64,
            actual: TealType::Bytes,
        };
        assert_eq!(
            err.to_string(),
            "type mismatch for key counter: expected uint64, got bytes"
        );

        let err = AppError::SchemaOverflow {
            store: "local",
            entries: 17,
            max: 16,
        };
        assert_eq!(err.to_string(), "local schema overflow: 17 entries > 16");
    }

    #[test]
    fn test_service_error_is_transparent() {
        let service = ServiceError::Unavailable("connection refused".into());
        let err = AppError::from(service.clone());
        assert_eq!(err.to_string(), service.to_string());
        assert_eq!(err, AppError::Service(service));
    }

    #[test]
    fn test_compile_error_converts() {
        let err: AppError = CompileError::InvalidArgument("x".into()).into();
        assert!(matches!(err, AppError::Compile(_)));
    }
}
