//! # Driven Ports (Outbound)
//!
//! Node services the application builder consumes. Errors are reported as
//! [`ServiceError`] and reach the caller unchanged.

use aad_types::Application;

use crate::errors::ServiceError;

// =============================================================================
// PROGRAM COMPILATION
// =============================================================================

/// Compiles TEAL source to program bytecode, usually through a node's
/// developer API.
pub trait ProgramCompiler: Send + Sync {
    /// Compile a program.
    ///
    /// # Arguments
    ///
    /// * `source` - TEAL source, starting with its `#pragma version`
    ///
    /// # Returns
    ///
    /// * `Vec<u8>` - The assembled program
    fn compile(&self, source: &str) -> Result<Vec<u8>, ServiceError>;
}

// =============================================================================
// APPLICATION LOOKUP
// =============================================================================

/// Reads deployed applications.
pub trait ApplicationReader: Send + Sync {
    /// Get a deployed application.
    ///
    /// # Arguments
    ///
    /// * `app_id` - Application id
    ///
    /// # Returns
    ///
    /// * `Application` - Its parameters and current global state
    /// * `ServiceError::ApplicationNotFound` - If no such application exists
    fn get_application(&self, app_id: u64) -> Result<Application, ServiceError>;
}
