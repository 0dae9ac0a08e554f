//! # REST Models
//!
//! Node API objects exchanged with dry runs and confirmation queries. Field
//! names follow the API verbatim (kebab-case). Missing optional sections
//! decode to `None` or empty collections.

use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};

use crate::address::Address;
use crate::transaction::{SuggestedParams, DEFAULT_VALIDITY_WINDOW};
use crate::value::{StateSchema, TealKeyValue, TealValue};

fn find_value<'a>(state: &'a [TealKeyValue], key: &[u8]) -> Option<&'a TealValue> {
    state.iter().find(|kv| kv.key == key).map(|kv| &kv.value)
}

// =============================================================================
// APPLICATIONS
// =============================================================================

/// A deployed (or simulated) application.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Application {
    /// Application id.
    pub id: u64,
    /// Programs, schemas and global state.
    #[serde(default)]
    pub params: ApplicationParams,
}

impl Application {
    /// Creates an application record with the given params.
    #[must_use]
    pub fn new(id: u64, params: ApplicationParams) -> Self {
        Self { id, params }
    }

    /// Escrow address of this application.
    #[must_use]
    pub fn address(&self) -> Address {
        Address::for_application(self.id)
    }
}

/// Parameters of an application.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApplicationParams {
    /// Creator account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<Address>,
    /// Compiled approval program.
    #[serde_as(as = "Option<Base64>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_program: Option<Vec<u8>>,
    /// Compiled clear-state program.
    #[serde_as(as = "Option<Base64>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clear_state_program: Option<Vec<u8>>,
    /// Global schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_state_schema: Option<StateSchema>,
    /// Local schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_state_schema: Option<StateSchema>,
    /// Current global state.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub global_state: Vec<TealKeyValue>,
}

impl ApplicationParams {
    /// Looks up a global state value by raw key.
    #[must_use]
    pub fn global_value(&self, key: impl AsRef<[u8]>) -> Option<&TealValue> {
        find_value(&self.global_state, key.as_ref())
    }
}

// =============================================================================
// ACCOUNTS
// =============================================================================

/// Participation status of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AccountStatus {
    /// Not participating in consensus.
    #[default]
    Offline,
    /// Participating in consensus.
    Online,
    /// Permanently excluded from consensus.
    NotParticipating,
}

/// An account and its application local states.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Account {
    /// Account address.
    pub address: Address,
    /// Balance in micro units.
    #[serde(default)]
    pub amount: u64,
    /// Balance excluding pending rewards.
    #[serde(default)]
    pub amount_without_pending_rewards: u64,
    /// Local states of the applications this account opted into.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub apps_local_state: Vec<ApplicationLocalState>,
    /// Participation status.
    #[serde(default)]
    pub status: AccountStatus,
}

impl Account {
    /// An offline account with the given balance and no local state.
    #[must_use]
    pub fn new(address: Address, amount: u64) -> Self {
        Self {
            address,
            amount,
            amount_without_pending_rewards: amount,
            apps_local_state: Vec::new(),
            status: AccountStatus::Offline,
        }
    }

    /// Adds (or replaces) the local state held for `app_id`.
    #[must_use]
    pub fn with_local_state(mut self, app_id: u64, key_values: Vec<TealKeyValue>) -> Self {
        self.apps_local_state.retain(|local| local.id != app_id);
        self.apps_local_state.push(ApplicationLocalState {
            id: app_id,
            key_value: key_values,
            schema: None,
        });
        self
    }

    /// Local state held for `app_id`, if opted in.
    #[must_use]
    pub fn local_state(&self, app_id: u64) -> Option<&ApplicationLocalState> {
        self.apps_local_state.iter().find(|local| local.id == app_id)
    }

    /// Looks up a local state value by application and raw key.
    #[must_use]
    pub fn local_value(&self, app_id: u64, key: impl AsRef<[u8]>) -> Option<&TealValue> {
        self.local_state(app_id)
            .and_then(|local| find_value(&local.key_value, key.as_ref()))
    }
}

/// An account's local state for one application.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApplicationLocalState {
    /// Application id.
    pub id: u64,
    /// Stored values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_value: Vec<TealKeyValue>,
    /// Local schema of the application.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<StateSchema>,
}

// =============================================================================
// TRANSACTION RESULTS
// =============================================================================

/// Pending (or confirmed) transaction information.
///
/// Only the fields needed to identify a created application are modelled;
/// unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PendingTransactionInfo {
    /// Id of the application created by this transaction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_index: Option<u64>,
    /// Round the transaction was confirmed in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_round: Option<u64>,
    /// Reason the transaction was dropped from the pool.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pool_error: String,
}

impl PendingTransactionInfo {
    /// Returns true once the transaction is in a block.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.confirmed_round.is_some_and(|round| round > 0)
    }

    /// Returns true if the pool rejected the transaction.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        !self.pool_error.is_empty()
    }
}

/// Suggested transaction parameters as reported by the node.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransactionParams {
    /// Consensus protocol version.
    #[serde(default)]
    pub consensus_version: String,
    /// Suggested per-byte fee.
    #[serde(default)]
    pub fee: u64,
    /// Genesis hash.
    #[serde_as(as = "Base64")]
    #[serde(default)]
    pub genesis_hash: Vec<u8>,
    /// Genesis id.
    #[serde(default)]
    pub genesis_id: String,
    /// Latest round seen by the node.
    #[serde(default)]
    pub last_round: u64,
    /// Minimum total fee.
    #[serde(default)]
    pub min_fee: u64,
}

impl From<TransactionParams> for SuggestedParams {
    fn from(params: TransactionParams) -> Self {
        Self {
            fee: params.fee,
            min_fee: params.min_fee,
            flat_fee: false,
            first_valid: params.last_round,
            last_valid: params.last_round.saturating_add(DEFAULT_VALIDITY_WINDOW),
            genesis_id: params.genesis_id,
            genesis_hash: params.genesis_hash,
        }
    }
}
