//! # Error Types

use crate::types::TealType;
use thiserror::Error;

/// Errors raised while compiling an expression to TEAL source.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// An operand or statement has the wrong static type.
    #[error("type mismatch in {context}: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Type required at this position.
        expected: TealType,
        /// Type of the expression found there.
        actual: TealType,
        /// Where the mismatch happened.
        context: String,
    },

    /// More distinct scratch slots than the evaluator provides.
    #[error("scratch space exhausted: more than {max} slots in use")]
    ScratchSpaceExhausted {
        /// Number of slots available.
        max: usize,
    },

    /// A structurally invalid expression or option.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CompileError::TypeMismatch {
            expected: TealType::Uint64,
            actual: TealType::Bytes,
            context: "return".into(),
        };
        assert_eq!(
            err.to_string(),
            "type mismatch in return: expected uint64, got bytes"
        );
        assert_eq!(
            CompileError::ScratchSpaceExhausted { max: 256 }.to_string(),
            "scratch space exhausted: more than 256 slots in use"
        );
    }
}
