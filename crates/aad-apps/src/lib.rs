//! # AlgoAppDev Apps - Typed State and Application Assembly
//!
//! Declares an application's persistent state as typed keys, assembles
//! invocation handlers into approval and clear-state programs, and builds
//! the transactions deploying them.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Keys are at most 64 bytes | `domain/invariants.rs` - `check_key_length()` |
//! | Keys are unique within a state | `domain/key_info.rs` - `KeySet::new()` |
//! | Writes match the declared type | `domain/key_info.rs` - `check_value_type()` |
//! | At most 64 global, 16 local entries | `domain/invariants.rs` - `check_global_schema()`, `check_local_schema()` |
//! | Invocation names are unique | `domain/builder.rs` - `AppBuilder::with_invocation()` |
//! | External state is read-only | `domain/state.rs` - `StateGlobalExternal`, `StateLocalExternal` |
//!
//! ## Outbound Dependencies
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | `ProgramCompiler` | TEAL source to bytecode |
//! | `ApplicationReader` | Deployed application lookup |
//!
//! ## Usage Example
//!
//! ```ignore
//! use aad_apps::prelude::*;
//!
//! let state = StateGlobal::new([KeyInfo::uint("counter")?.with_default(Expr::int(0))?])?;
//! let count = state.set("counter", state.get("counter")? + Expr::int(1))?;
//! let builder = AppBuilder::new()
//!     .with_global_state(state)
//!     .with_invocation("count", Expr::seq([count, Expr::approve()]))?;
//!
//! let txn = builder.create_txn(&node, creator, &params)?;
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod ports;

pub use adapters::InMemoryNode;
pub use domain::{
    AppBuilder, AppMeta, AppSchema, KeyInfo, KeySet, State, StateGlobal, StateGlobalExternal,
    StateKey, StateLocal, StateLocalExternal,
};
pub use errors::{AppError, ServiceError};
pub use ports::{ApplicationReader, ProgramCompiler};

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // State
    pub use crate::domain::key_info::{KeyInfo, StateKey};
    pub use crate::domain::state::{
        State, StateGlobal, StateGlobalExternal, StateLocal, StateLocalExternal,
    };

    // Application
    pub use crate::domain::builder::{AppBuilder, AppSchema};
    pub use crate::domain::meta::AppMeta;
    pub use crate::domain::invariants::limits;

    // Ports and adapters
    pub use crate::adapters::InMemoryNode;
    pub use crate::ports::outbound::{ApplicationReader, ProgramCompiler};

    // Errors
    pub use crate::errors::{AppError, ServiceError};

    // Expressions
    pub use aad_teal::prelude::*;
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
