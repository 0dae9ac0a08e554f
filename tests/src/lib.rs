//! # AlgoAppDev Test Suite
//!
//! End-to-end flows across the workspace crates. No node is required:
//! compilation and application lookup go through `InMemoryNode`, and
//! dry-run results are canned node responses.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── counter_app.rs   # Global counter: deploy, dry run, read deltas
//!     ├── dispatch.rs      # Invocation routing and on-completion handlers
//!     └── dryrun_flow.rs   # Request wire form, failures, local deltas
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p aad-tests
//!
//! # One flow
//! cargo test -p aad-tests integration::counter_app::
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
