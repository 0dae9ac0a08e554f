//! # AlgoAppDev TEAL
//!
//! Logic expressions for stateful applications and their compilation to
//! TEAL assembly source.
//!
//! ## Components
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | Types | `types.rs` | Static expression types |
//! | Fields | `fields.rs` | `txn`, `txna` and `global` field names |
//! | Expressions | `expr.rs` | The `Expr` tree and its operators |
//! | Builtins | `builtins.rs` | `Txn`, `Global` and `App` shorthands |
//! | Scratch | `scratch.rs` | Scratch slots and `MaybeValue` |
//! | Compiler | `compiler.rs` | `Expr` to TEAL source |
//!
//! ## Usage Example
//!
//! ```ignore
//! use aad_teal::prelude::*;
//!
//! let program = Expr::seq([
//!     App::global_put("counter", App::global_get("counter") + Expr::int(1)),
//!     Expr::approve(),
//! ]);
//! let source = compile_expr(&program, &CompileOptions::default())?;
//! assert!(source.starts_with("#pragma version 5"));
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod builtins;
pub mod compiler;
pub mod errors;
pub mod expr;
pub mod fields;
pub mod scratch;
pub mod types;

pub use builtins::{App, Global, Txn};
pub use compiler::{compile_expr, compile_lines, CompileOptions, Line};
pub use errors::CompileError;
pub use expr::{BinaryOp, Expr, LogicalOp, StateOp, UnaryOp};
pub use fields::{GlobalField, TxnArrayField, TxnField};
pub use scratch::{MaybeValue, ScratchSlot};
pub use types::TealType;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::builtins::{App, Global, Txn};
    pub use crate::compiler::{compile_expr, CompileOptions};
    pub use crate::errors::CompileError;
    pub use crate::expr::Expr;
    pub use crate::scratch::{MaybeValue, ScratchSlot};
    pub use crate::types::TealType;
}
