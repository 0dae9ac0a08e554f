//! # Error Types

use thiserror::Error;

/// Errors raised while decoding platform values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypesError {
    /// Address text is not valid base32, has the wrong length or a bad checksum.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// A wire value has an unknown type tag or is missing its payload.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// An on-completion code outside the known range.
    #[error("unknown on-completion code: {0}")]
    UnknownOnComplete(u8),
}
