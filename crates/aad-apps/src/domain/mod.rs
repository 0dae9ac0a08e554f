//! # Domain Layer
//!
//! State declarations and application assembly. No I/O: compilation to
//! bytecode and application lookups go through the outbound ports.

pub mod builder;
pub mod invariants;
pub mod key_info;
pub mod meta;
pub mod state;

pub use builder::{AppBuilder, AppSchema};
pub use invariants::{check_global_schema, check_key_length, check_local_schema, limits};
pub use key_info::{KeyInfo, KeySet, StateKey};
pub use meta::AppMeta;
pub use state::{State, StateGlobal, StateGlobalExternal, StateLocal, StateLocalExternal};
