//! # Dry-Run Request
//!
//! The payload accepted by the node's `/v2/teal/dryrun` endpoint.

use aad_types::{Account, Application, SignedTransaction};
use serde::{Deserialize, Serialize};

/// Which program a [`DryrunSource`] replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceField {
    /// The approval program.
    #[serde(rename = "approv")]
    Approval,
    /// The clear-state program.
    #[serde(rename = "clearp")]
    ClearState,
    /// A logic signature.
    #[serde(rename = "lsig")]
    LogicSig,
}

/// TEAL source the node assembles in place of a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DryrunSource {
    /// Program replaced by this source.
    pub field_name: SourceField,
    /// TEAL source, starting with its `#pragma version`.
    pub source: String,
    /// Transaction index, for logic signatures.
    #[serde(default)]
    pub txn_index: u64,
    /// Application the source belongs to.
    #[serde(default)]
    pub app_index: u64,
}

/// Transactions to evaluate, and the ledger state to evaluate them against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DryrunRequest {
    /// Transactions, evaluated as a group.
    #[serde(default)]
    pub txns: Vec<SignedTransaction>,
    /// Applications referenced by the transactions.
    #[serde(default)]
    pub apps: Vec<Application>,
    /// Accounts referenced by the transactions.
    #[serde(default)]
    pub accounts: Vec<Account>,
    /// Sources replacing program bytecode.
    #[serde(default)]
    pub sources: Vec<DryrunSource>,
    /// Consensus protocol; the node's current one when empty.
    #[serde(default)]
    pub protocol_version: String,
    /// Round the evaluation pretends to run in.
    #[serde(default)]
    pub round: u64,
    /// Timestamp returned by `global LatestTimestamp`.
    #[serde(default)]
    pub latest_timestamp: u64,
}

impl DryrunRequest {
    /// JSON body for the dry-run endpoint.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; unreachable for well-formed values.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_source_wire_form() {
        let source = DryrunSource {
            field_name: SourceField::ClearState,
            source: "#pragma version 5\nint 1".into(),
            txn_index: 0,
            app_index: 9,
        };
        assert_eq!(
            serde_json::to_value(&source).unwrap(),
            json!({
                "field-name": "clearp",
                "source": "#pragma version 5\nint 1",
                "txn-index": 0,
                "app-index": 9
            })
        );
    }

    #[test]
    fn test_empty_request_wire_form() {
        let value = serde_json::to_value(DryrunRequest::default()).unwrap();
        assert_eq!(value["txns"], json!([]));
        assert_eq!(value["latest-timestamp"], json!(0));
        assert_eq!(value["protocol-version"], json!(""));
    }
}
