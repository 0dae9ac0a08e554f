//! # Ports Layer
//!
//! Interfaces to the node services the builder depends on. No concrete
//! implementations in this module.

pub mod outbound;

pub use outbound::*;
