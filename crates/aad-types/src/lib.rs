//! # AlgoAppDev Shared Types
//!
//! Value types shared by every AlgoAppDev crate.
//!
//! ## Contents
//!
//! | Module | Types |
//! |--------|-------|
//! | `address` | `Address` (base32 text form with checksum, application addresses) |
//! | `value` | `TealValue`, `TealKeyValue`, `StateSchema` |
//! | `transaction` | `OnComplete`, `SuggestedParams`, `Transaction`, `SignedTransaction` |
//! | `models` | REST models: `Application`, `Account`, `PendingTransactionInfo` |
//!
//! All wire models serialize with the field names used by the node's REST
//! API (kebab-case) and by the transaction encoding (short keys such as
//! `snd` and `apid`). Byte strings travel as base64, addresses as base32.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod address;
pub mod errors;
pub mod models;
pub mod transaction;
pub mod value;

pub use address::Address;
pub use errors::TypesError;
pub use models::{
    Account, AccountStatus, Application, ApplicationLocalState, ApplicationParams,
    PendingTransactionInfo, TransactionParams,
};
pub use transaction::{
    pad_lease_bytes, OnComplete, SignedTransaction, SuggestedParams, Transaction, TxnType,
    LEASE_LENGTH,
};
pub use value::{StateSchema, TealKeyValue, TealValue};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
