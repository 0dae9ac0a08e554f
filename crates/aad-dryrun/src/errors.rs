//! # Error Types
//!
//! Errors raised while building dry-run requests or reading their results.

use aad_apps::AppError;
use thiserror::Error;

/// Dry-run errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DryrunError {
    /// The request lacks a program or a transaction.
    #[error("incomplete dry run: {0}")]
    IncompleteDryrun(String),

    /// The result lacks a section the query needs, or holds undecodable data.
    #[error("malformed dry-run result: {0}")]
    MalformedResult(String),

    /// The node reported an error for the whole request.
    #[error("dry run failed: {0}")]
    DryrunFailed(String),

    /// Assembling the application under test failed.
    #[error(transparent)]
    App(#[from] AppError),
}

impl DryrunError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResult(message.into())
    }
}
