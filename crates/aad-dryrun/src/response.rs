//! # Dry-Run Response
//!
//! The node's dry-run result, decoded with serde. Sections the node omits
//! stay `None` so queries can tell "absent" from "empty".

use aad_types::{Address, TealValue};
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};

use crate::errors::DryrunError;

/// Message the node records when a program approves.
pub const PASS: &str = "PASS";

/// Message the node records when a program rejects.
pub const REJECT: &str = "REJECT";

/// Result of a whole dry-run request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DryrunResponse {
    /// Request-level error; empty when the request was evaluated.
    #[serde(default)]
    pub error: String,
    /// Protocol the request was evaluated under.
    #[serde(default)]
    pub protocol_version: String,
    /// One result per transaction.
    #[serde(default)]
    pub txns: Option<Vec<DryrunTxnResult>>,
}

impl DryrunResponse {
    /// Decodes a response body.
    ///
    /// # Errors
    ///
    /// * `MalformedResult` - the body is not a dry-run result
    pub fn from_json(body: &str) -> Result<Self, DryrunError> {
        serde_json::from_str(body).map_err(|err| DryrunError::malformed(err.to_string()))
    }

    /// Decodes a response already parsed as JSON.
    ///
    /// # Errors
    ///
    /// * `MalformedResult` - the value is not a dry-run result
    pub fn from_value(value: serde_json::Value) -> Result<Self, DryrunError> {
        serde_json::from_value(value).map_err(|err| DryrunError::malformed(err.to_string()))
    }

    /// Per-transaction results.
    ///
    /// # Errors
    ///
    /// * `MalformedResult` - the result has no `txns` section
    pub fn txn_results(&self) -> Result<&[DryrunTxnResult], DryrunError> {
        self.txns
            .as_deref()
            .ok_or_else(|| DryrunError::malformed("result has no txns section"))
    }

    /// Result of transaction `index`.
    ///
    /// # Errors
    ///
    /// * `MalformedResult` - no `txns` section, or no transaction `index`
    pub fn txn(&self, index: usize) -> Result<&DryrunTxnResult, DryrunError> {
        let txns = self.txn_results()?;
        txns.get(index).ok_or_else(|| {
            DryrunError::malformed(format!(
                "result has {} transactions, no index {index}",
                txns.len()
            ))
        })
    }
}

/// Evaluation of one transaction.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DryrunTxnResult {
    /// Disassembled approval (or clear-state) program, one line per entry.
    pub disassembly: Option<Vec<String>>,
    /// Disassembled logic signature.
    pub logic_sig_disassembly: Option<Vec<String>>,
    /// Messages of the application program evaluation.
    pub app_call_messages: Option<Vec<String>>,
    /// Stack after each executed line of the application program.
    pub app_call_trace: Option<Vec<DryrunState>>,
    /// Messages of the logic signature evaluation.
    pub logic_sig_messages: Option<Vec<String>>,
    /// Stack after each executed line of the logic signature.
    pub logic_sig_trace: Option<Vec<DryrunState>>,
    /// Changes to the application's global state.
    pub global_delta: Option<Vec<EvalDeltaKeyValue>>,
    /// Changes to accounts' local states.
    pub local_deltas: Option<Vec<AccountStateDelta>>,
    /// Values logged by the program.
    #[serde_as(as = "Option<Vec<Base64>>")]
    pub logs: Option<Vec<Vec<u8>>>,
    /// Opcode cost of the evaluation.
    pub cost: Option<u64>,
}

impl DryrunTxnResult {
    /// Returns true if the application program approved.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.app_call_messages
            .as_ref()
            .is_some_and(|messages| messages.iter().any(|message| message == PASS))
    }

    /// Returns true if the application program rejected.
    #[must_use]
    pub fn rejected(&self) -> bool {
        self.app_call_messages
            .as_ref()
            .is_some_and(|messages| messages.iter().any(|message| message == REJECT))
    }

    /// Returns true if the application program ran.
    #[must_use]
    pub fn evaluated(&self) -> bool {
        self.app_call_messages.is_some()
    }
}

/// The stack after one executed line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DryrunState {
    /// 1-based line in the disassembly.
    pub line: u64,
    /// Program counter.
    #[serde(default)]
    pub pc: u64,
    /// Stack, bottom first.
    #[serde(default)]
    pub stack: Vec<TealValue>,
    /// Evaluation error raised on this line.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

/// A state change as the node encodes it: `action` 1 sets bytes, 2 sets an
/// integer, 3 deletes.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalDelta {
    /// Action code.
    pub action: u8,
    /// Bytes written by action 1.
    #[serde_as(as = "Option<Base64>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<Vec<u8>>,
    /// Integer written by action 2.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uint: Option<u64>,
}

/// A state change and the key it applies to.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalDeltaKeyValue {
    /// Raw key.
    #[serde_as(as = "Base64")]
    pub key: Vec<u8>,
    /// The change.
    pub value: EvalDelta,
}

/// Local state changes of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStateDelta {
    /// The account.
    pub address: Address,
    /// Its changes.
    #[serde(default)]
    pub delta: Vec<EvalDeltaKeyValue>,
}

/// Fails if the node reported a request-level error.
///
/// # Errors
///
/// * `DryrunFailed` - the result carries a non-empty `error`
pub fn check_err(result: &DryrunResponse) -> Result<(), DryrunError> {
    if result.error.is_empty() {
        Ok(())
    } else {
        Err(DryrunError::DryrunFailed(result.error.clone()))
    }
}

/// Application program messages of every transaction, in order.
///
/// # Errors
///
/// * `MalformedResult` - the result has no `txns` section
pub fn get_messages(result: &DryrunResponse) -> Result<Vec<String>, DryrunError> {
    Ok(result
        .txn_results()?
        .iter()
        .filter_map(|txn| txn.app_call_messages.as_ref())
        .flatten()
        .cloned()
        .collect())
}

/// Whether transaction `txn_index`'s application program approved.
///
/// # Errors
///
/// * `MalformedResult` - the transaction is missing or its program never ran
pub fn passed(result: &DryrunResponse, txn_index: usize) -> Result<bool, DryrunError> {
    let txn = result.txn(txn_index)?;
    if !txn.evaluated() {
        return Err(DryrunError::malformed(format!(
            "transaction {txn_index} has no app-call-messages section"
        )));
    }
    Ok(txn.passed())
}
