//! # Domain Invariants
//!
//! Platform limits on application state, and the checks enforcing them.

use aad_types::StateSchema;

use crate::errors::AppError;

/// Platform limits.
pub mod limits {
    /// Longest state key, in bytes.
    pub const MAX_KEY_LENGTH: usize = 64;
    /// Most global state entries an application may reserve.
    pub const MAX_GLOBAL_ENTRIES: u64 = 64;
    /// Most local state entries an application may reserve per account.
    pub const MAX_LOCAL_ENTRIES: u64 = 16;
}

/// Fails if `key` is longer than [`limits::MAX_KEY_LENGTH`].
///
/// # Errors
///
/// * `InvalidKey` - the key is too long
pub fn check_key_length(key: &[u8], display: &str) -> Result<(), AppError> {
    if key.len() > limits::MAX_KEY_LENGTH {
        return Err(AppError::InvalidKey {
            key: display.to_string(),
            reason: format!(
                "{} bytes exceeds the maximum of {}",
                key.len(),
                limits::MAX_KEY_LENGTH
            ),
        });
    }
    Ok(())
}

/// Fails if the global schema reserves more than [`limits::MAX_GLOBAL_ENTRIES`].
///
/// # Errors
///
/// * `SchemaOverflow` - too many entries
pub fn check_global_schema(schema: &StateSchema) -> Result<(), AppError> {
    check_entries("global", schema, limits::MAX_GLOBAL_ENTRIES)
}

/// Fails if the local schema reserves more than [`limits::MAX_LOCAL_ENTRIES`].
///
/// # Errors
///
/// * `SchemaOverflow` - too many entries
pub fn check_local_schema(schema: &StateSchema) -> Result<(), AppError> {
    check_entries("local", schema, limits::MAX_LOCAL_ENTRIES)
}

fn check_entries(store: &'static str, schema: &StateSchema, max: u64) -> Result<(), AppError> {
    let entries = schema.total();
    if entries > max {
        return Err(AppError::SchemaOverflow {
            store,
            entries,
            max,
        });
    }
    Ok(())
}
