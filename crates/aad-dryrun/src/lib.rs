//! # AlgoAppDev Dry Runs
//!
//! Builds dry-run requests for an application under test and reads the
//! node's results back as traces and state deltas.
//!
//! ## Components
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | Request | `request.rs` | `DryrunRequest` wire model |
//! | Context | `context.rs` | `DryrunContext` request builder, `source_run`, `builder_run` |
//! | Response | `response.rs` | `DryrunResponse` wire model, `check_err`, `get_messages`, `passed` |
//! | Trace | `trace.rs` | `get_trace` |
//! | Deltas | `delta.rs` | `get_global_deltas`, `get_local_deltas`, `get_all_local_deltas` |
//!
//! Running the request is left to the caller: post
//! `request.to_json()` to the node and decode the body with
//! `DryrunResponse::from_json`.
//!
//! ## Usage Example
//!
//! ```ignore
//! use aad_dryrun::prelude::*;
//!
//! let request = DryrunContext::new()
//!     .with_app_builder(&builder)?
//!     .with_txn_call(vec![b"count".to_vec()], vec![], Some(sender))
//!     .build_request()?;
//!
//! let result = DryrunResponse::from_json(&node.dryrun(&request.to_json()?)?)?;
//! check_err(&result)?;
//! assert_eq!(get_global_deltas(&result)?, vec![KeyDelta::set("counter", 1u64)]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod context;
pub mod delta;
pub mod errors;
pub mod request;
pub mod response;
pub mod trace;

pub use context::{builder_run, source_run, AppPrograms, DryrunContext, Program, DEFAULT_APP_ID};
pub use delta::{get_all_local_deltas, get_global_deltas, get_local_deltas, DeltaAction, KeyDelta};
pub use errors::DryrunError;
pub use request::{DryrunRequest, DryrunSource, SourceField};
pub use response::{
    check_err, get_messages, passed, AccountStateDelta, DryrunResponse, DryrunState,
    DryrunTxnResult, EvalDelta, EvalDeltaKeyValue,
};
pub use trace::{get_trace, Trace, TraceEntry};

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::context::{builder_run, source_run, AppPrograms, DryrunContext};
    pub use crate::delta::{
        get_all_local_deltas, get_global_deltas, get_local_deltas, DeltaAction, KeyDelta,
    };
    pub use crate::errors::DryrunError;
    pub use crate::request::DryrunRequest;
    pub use crate::response::{check_err, get_messages, passed, DryrunResponse};
    pub use crate::trace::{get_trace, TraceEntry};
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
