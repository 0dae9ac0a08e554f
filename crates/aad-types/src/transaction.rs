//! # Application Call Transactions
//!
//! Unsigned application-call transactions in the platform's JSON transaction
//! encoding. Field names are the short keys used on the wire (`snd`, `apid`,
//! `apaa`, ...); empty fields are omitted.

use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as, FromInto};

use crate::address::Address;
use crate::errors::TypesError;
use crate::value::{StateSchema, TxnSchema};

/// Length of a transaction lease.
pub const LEASE_LENGTH: usize = 32;

/// Rounds a transaction stays valid when built from suggested params.
pub const DEFAULT_VALIDITY_WINDOW: u64 = 1000;

// =============================================================================
// ON COMPLETE
// =============================================================================

/// Action taken after an application call's approval program succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum OnComplete {
    /// Plain call.
    #[default]
    NoOp = 0,
    /// Allocate local state for the sender.
    OptIn = 1,
    /// Release the sender's local state.
    CloseOut = 2,
    /// Forcibly release the sender's local state (runs the clear program).
    ClearState = 3,
    /// Replace the application's programs.
    UpdateApplication = 4,
    /// Delete the application.
    DeleteApplication = 5,
}

impl OnComplete {
    /// Numeric code as seen by programs (`txn OnCompletion`).
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Name of the constant in program source.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NoOp => "NoOp",
            Self::OptIn => "OptIn",
            Self::CloseOut => "CloseOut",
            Self::ClearState => "ClearState",
            Self::UpdateApplication => "UpdateApplication",
            Self::DeleteApplication => "DeleteApplication",
        }
    }

    fn is_noop(&self) -> bool {
        *self == Self::NoOp
    }
}

impl TryFrom<u8> for OnComplete {
    type Error = TypesError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::NoOp),
            1 => Ok(Self::OptIn),
            2 => Ok(Self::CloseOut),
            3 => Ok(Self::ClearState),
            4 => Ok(Self::UpdateApplication),
            5 => Ok(Self::DeleteApplication),
            other => Err(TypesError::UnknownOnComplete(other)),
        }
    }
}

impl From<OnComplete> for u8 {
    fn from(on_complete: OnComplete) -> Self {
        on_complete.code()
    }
}

// =============================================================================
// SUGGESTED PARAMS
// =============================================================================

/// Network parameters needed to build a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SuggestedParams {
    /// Fee, either flat or per byte depending on `flat_fee`.
    pub fee: u64,
    /// Minimum fee accepted by the network.
    pub min_fee: u64,
    /// Whether `fee` is the total fee.
    pub flat_fee: bool,
    /// First round the transaction is valid.
    pub first_valid: u64,
    /// Last round the transaction is valid.
    pub last_valid: u64,
    /// Genesis id of the network.
    pub genesis_id: String,
    /// Genesis hash of the network.
    pub genesis_hash: Vec<u8>,
}

impl SuggestedParams {
    /// The fee to set on a transaction.
    ///
    /// Per-byte fees depend on the signed encoding, which is produced by the
    /// signer; the network minimum is used as the floor here.
    #[must_use]
    pub fn fee(&self) -> u64 {
        if self.flat_fee {
            self.fee
        } else {
            self.fee.max(self.min_fee)
        }
    }
}

// =============================================================================
// TRANSACTION
// =============================================================================

/// Transaction type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TxnType {
    /// An application call.
    #[default]
    #[serde(rename = "appl")]
    ApplicationCall,
}

/// An application-call transaction.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction type.
    #[serde(rename = "type")]
    pub txn_type: TxnType,
    /// Sender.
    #[serde(rename = "snd")]
    pub sender: Address,
    /// Total fee in micro units.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub fee: u64,
    /// First valid round.
    #[serde(rename = "fv", default, skip_serializing_if = "is_zero")]
    pub first_valid: u64,
    /// Last valid round.
    #[serde(rename = "lv", default, skip_serializing_if = "is_zero")]
    pub last_valid: u64,
    /// Genesis id.
    #[serde(rename = "gen", default, skip_serializing_if = "String::is_empty")]
    pub genesis_id: String,
    /// Genesis hash.
    #[serde_as(as = "Option<Base64>")]
    #[serde(rename = "gh", skip_serializing_if = "Option::is_none")]
    pub genesis_hash: Option<Vec<u8>>,
    /// Free-form note.
    #[serde_as(as = "Option<Base64>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Vec<u8>>,
    /// Lease (exactly 32 bytes when set).
    #[serde_as(as = "Option<Base64>")]
    #[serde(rename = "lx", skip_serializing_if = "Option::is_none")]
    pub lease: Option<Vec<u8>>,
    /// Group id.
    #[serde_as(as = "Option<Base64>")]
    #[serde(rename = "grp", skip_serializing_if = "Option::is_none")]
    pub group: Option<Vec<u8>>,
    /// Application id, zero when creating.
    #[serde(rename = "apid", default, skip_serializing_if = "is_zero")]
    pub app_id: u64,
    /// On-completion action.
    #[serde(rename = "apan", default, skip_serializing_if = "OnComplete::is_noop")]
    pub on_complete: OnComplete,
    /// Compiled approval program.
    #[serde_as(as = "Option<Base64>")]
    #[serde(rename = "apap", skip_serializing_if = "Option::is_none")]
    pub approval_program: Option<Vec<u8>>,
    /// Compiled clear-state program.
    #[serde_as(as = "Option<Base64>")]
    #[serde(rename = "apsu", skip_serializing_if = "Option::is_none")]
    pub clear_program: Option<Vec<u8>>,
    /// Application arguments.
    #[serde_as(as = "Vec<Base64>")]
    #[serde(rename = "apaa", default, skip_serializing_if = "Vec::is_empty")]
    pub app_args: Vec<Vec<u8>>,
    /// Accounts the program may access besides the sender.
    #[serde(rename = "apat", default, skip_serializing_if = "Vec::is_empty")]
    pub accounts: Vec<Address>,
    /// Applications the program may read.
    #[serde(rename = "apfa", default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_apps: Vec<u64>,
    /// Assets the program may read.
    #[serde(rename = "apas", default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_assets: Vec<u64>,
    /// Global schema, set on creation.
    #[serde_as(as = "Option<FromInto<TxnSchema>>")]
    #[serde(rename = "apgs", skip_serializing_if = "Option::is_none")]
    pub global_schema: Option<StateSchema>,
    /// Local schema, set on creation.
    #[serde_as(as = "Option<FromInto<TxnSchema>>")]
    #[serde(rename = "apls", skip_serializing_if = "Option::is_none")]
    pub local_schema: Option<StateSchema>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(value: &u64) -> bool {
    *value == 0
}

impl Transaction {
    /// Builds a call to `app_id` with the given on-completion action.
    #[must_use]
    pub fn application_call(
        sender: Address,
        params: &SuggestedParams,
        app_id: u64,
        on_complete: OnComplete,
    ) -> Self {
        Self {
            txn_type: TxnType::ApplicationCall,
            sender,
            fee: params.fee(),
            first_valid: params.first_valid,
            last_valid: params.last_valid,
            genesis_id: params.genesis_id.clone(),
            genesis_hash: (!params.genesis_hash.is_empty()).then(|| params.genesis_hash.clone()),
            app_id,
            on_complete,
            ..Self::default()
        }
    }

    /// Sets the application arguments.
    #[must_use]
    pub fn with_args(mut self, args: Vec<Vec<u8>>) -> Self {
        self.app_args = args;
        self
    }

    /// Sets the extra accounts.
    #[must_use]
    pub fn with_accounts(mut self, accounts: Vec<Address>) -> Self {
        self.accounts = accounts;
        self
    }

    /// Sets the foreign applications.
    #[must_use]
    pub fn with_foreign_apps(mut self, apps: Vec<u64>) -> Self {
        self.foreign_apps = apps;
        self
    }

    /// Sets both compiled programs.
    #[must_use]
    pub fn with_programs(mut self, approval: Vec<u8>, clear: Vec<u8>) -> Self {
        self.approval_program = Some(approval);
        self.clear_program = Some(clear);
        self
    }

    /// Sets both state schemas.
    #[must_use]
    pub fn with_schemas(mut self, global: StateSchema, local: StateSchema) -> Self {
        self.global_schema = Some(global);
        self.local_schema = Some(local);
        self
    }

    /// Sets the note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<Vec<u8>>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Sets the lease, padded or truncated to [`LEASE_LENGTH`] bytes.
    #[must_use]
    pub fn with_lease(mut self, lease: &[u8]) -> Self {
        self.lease = Some(pad_lease_bytes(lease).to_vec());
        self
    }

    /// Returns true if this call creates an application.
    #[must_use]
    pub fn is_create(&self) -> bool {
        self.app_id == 0
    }
}

/// Right pads `lease` with zeros (or truncates it) to [`LEASE_LENGTH`] bytes.
#[must_use]
pub fn pad_lease_bytes(lease: &[u8]) -> [u8; LEASE_LENGTH] {
    let mut padded = [0u8; LEASE_LENGTH];
    let len = lease.len().min(LEASE_LENGTH);
    padded[..len].copy_from_slice(&lease[..len]);
    padded
}

/// A transaction with its (optional) signature, the form the node accepts.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// The transaction.
    pub txn: Transaction,
    /// Ed25519 signature. Dry runs accept unsigned transactions.
    #[serde_as(as = "Option<Base64>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sig: Option<Vec<u8>>,
}

impl SignedTransaction {
    /// Wraps a transaction without a signature.
    #[must_use]
    pub fn unsigned(txn: Transaction) -> Self {
        Self { txn, sig: None }
    }
}

impl From<Transaction> for SignedTransaction {
    fn from(txn: Transaction) -> Self {
        Self::unsigned(txn)
    }
}
