//! # State Deltas
//!
//! Decodes the `global-delta` and `local-deltas` sections of a dry-run
//! result into [`KeyDelta`]s, in the order the node emitted them.
//!
//! A transaction whose program ran but changed nothing has no delta
//! section; that reads as "no deltas". A result where no application
//! program ran at all is malformed, since the question has no answer.

use std::collections::BTreeMap;
use std::fmt;

use aad_types::{Address, TealValue};

use crate::errors::DryrunError;
use crate::response::{DryrunResponse, DryrunTxnResult, EvalDelta, EvalDeltaKeyValue};

/// Action code setting a byte string.
pub const ACTION_SET_BYTES: u8 = 1;
/// Action code setting an integer.
pub const ACTION_SET_UINT: u8 = 2;
/// Action code deleting the key.
pub const ACTION_DELETE: u8 = 3;

/// What happened to a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeltaAction {
    /// The key now holds this value.
    Set(TealValue),
    /// The key was deleted.
    Delete,
}

/// A change to one state key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDelta {
    /// Raw key.
    pub key: Vec<u8>,
    /// The change.
    pub action: DeltaAction,
}

impl KeyDelta {
    /// A delta setting `key` to `value`.
    #[must_use]
    pub fn set(key: impl AsRef<[u8]>, value: impl Into<TealValue>) -> Self {
        Self {
            key: key.as_ref().to_vec(),
            action: DeltaAction::Set(value.into()),
        }
    }

    /// A delta deleting `key`.
    #[must_use]
    pub fn delete(key: impl AsRef<[u8]>) -> Self {
        Self {
            key: key.as_ref().to_vec(),
            action: DeltaAction::Delete,
        }
    }

    /// The value written, or `None` for a delete.
    #[must_use]
    pub fn value(&self) -> Option<&TealValue> {
        match &self.action {
            DeltaAction::Set(value) => Some(value),
            DeltaAction::Delete => None,
        }
    }
}

impl fmt::Display for KeyDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = TealValue::Bytes(self.key.clone());
        match &self.action {
            DeltaAction::Set(value) => write!(f, "{key} = {value}"),
            DeltaAction::Delete => write!(f, "{key} deleted"),
        }
    }
}

impl TryFrom<&EvalDeltaKeyValue> for KeyDelta {
    type Error = DryrunError;

    fn try_from(entry: &EvalDeltaKeyValue) -> Result<Self, Self::Error> {
        let EvalDelta {
            action,
            bytes,
            uint,
        } = &entry.value;
        // The node omits zero values.
        let action = match *action {
            ACTION_SET_BYTES => DeltaAction::Set(TealValue::Bytes(bytes.clone().unwrap_or_default())),
            ACTION_SET_UINT => DeltaAction::Set(TealValue::Uint(uint.unwrap_or_default())),
            ACTION_DELETE => DeltaAction::Delete,
            other => {
                return Err(DryrunError::malformed(format!(
                    "unknown delta action {other}"
                )))
            }
        };
        Ok(Self {
            key: entry.key.clone(),
            action,
        })
    }
}

fn evaluated_txns(result: &DryrunResponse) -> Result<Vec<&DryrunTxnResult>, DryrunError> {
    let evaluated: Vec<&DryrunTxnResult> = result
        .txn_results()?
        .iter()
        .filter(|txn| txn.evaluated())
        .collect();
    if evaluated.is_empty() {
        return Err(DryrunError::malformed(
            "no transaction has an app-call-messages section",
        ));
    }
    Ok(evaluated)
}

fn decode_all<'a>(
    entries: impl IntoIterator<Item = &'a EvalDeltaKeyValue>,
) -> Result<Vec<KeyDelta>, DryrunError> {
    entries.into_iter().map(KeyDelta::try_from).collect()
}

/// Global state changes across every transaction.
///
/// # Errors
///
/// * `MalformedResult` - no `txns` section, no evaluated application
///   program, or an undecodable delta
pub fn get_global_deltas(result: &DryrunResponse) -> Result<Vec<KeyDelta>, DryrunError> {
    decode_all(
        evaluated_txns(result)?
            .into_iter()
            .filter_map(|txn| txn.global_delta.as_ref())
            .flatten(),
    )
}

/// Local state changes of `address` across every transaction.
///
/// # Errors
///
/// See [`get_global_deltas`].
pub fn get_local_deltas(
    result: &DryrunResponse,
    address: &Address,
) -> Result<Vec<KeyDelta>, DryrunError> {
    decode_all(
        evaluated_txns(result)?
            .into_iter()
            .filter_map(|txn| txn.local_deltas.as_ref())
            .flatten()
            .filter(|account| account.address == *address)
            .flat_map(|account| &account.delta),
    )
}

/// Local state changes of every account, keyed by address.
///
/// # Errors
///
/// See [`get_global_deltas`].
pub fn get_all_local_deltas(
    result: &DryrunResponse,
) -> Result<BTreeMap<Address, Vec<KeyDelta>>, DryrunError> {
    let mut deltas: BTreeMap<Address, Vec<KeyDelta>> = BTreeMap::new();
    for txn in evaluated_txns(result)? {
        for account in txn.local_deltas.iter().flatten() {
            deltas
                .entry(account.address)
                .or_default()
                .extend(decode_all(&account.delta)?);
        }
    }
    Ok(deltas)
}
