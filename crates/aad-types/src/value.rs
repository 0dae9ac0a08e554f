//! # State Values
//!
//! Values held in application state and the schema that bounds them.

use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};
use std::fmt;

use crate::errors::TypesError;

/// Wire tag for byte-string values.
pub const TYPE_BYTES: u8 = 1;
/// Wire tag for integer values.
pub const TYPE_UINT: u8 = 2;

// =============================================================================
// TEAL VALUE
// =============================================================================

/// A value stored under a state key or held on the evaluation stack.
///
/// On the wire this is `{"type": 1, "bytes": <base64>}` for byte strings and
/// `{"type": 2, "uint": <u64>}` for integers.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TealValueModel", into = "TealValueModel")]
pub enum TealValue {
    /// A 64-bit unsigned integer.
    Uint(u64),
    /// A byte string.
    Bytes(Vec<u8>),
}

impl TealValue {
    /// Returns the integer, if this is one.
    #[must_use]
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Self::Uint(value) => Some(*value),
            Self::Bytes(_) => None,
        }
    }

    /// Returns the byte string, if this is one.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(value) => Some(value),
            Self::Uint(_) => None,
        }
    }

    /// The wire type tag.
    #[must_use]
    pub const fn type_tag(&self) -> u8 {
        match self {
            Self::Bytes(_) => TYPE_BYTES,
            Self::Uint(_) => TYPE_UINT,
        }
    }
}

impl fmt::Debug for TealValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(value) => write!(f, "Uint({value})"),
            Self::Bytes(value) => write!(f, "Bytes(0x{})", hex::encode(value)),
        }
    }
}

impl fmt::Display for TealValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(value) => write!(f, "{value}"),
            Self::Bytes(value) => match std::str::from_utf8(value) {
                Ok(text) if !text.is_empty() && text.chars().all(|c| !c.is_control()) => {
                    write!(f, "{text:?}")
                }
                _ => write!(f, "0x{}", hex::encode(value)),
            },
        }
    }
}

impl From<u64> for TealValue {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<Vec<u8>> for TealValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<&[u8]> for TealValue {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl From<&str> for TealValue {
    fn from(value: &str) -> Self {
        Self::Bytes(value.as_bytes().to_vec())
    }
}

/// Tagged form used on the wire. The node fills both payload fields, so the
/// tag alone decides which one is meaningful.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TealValueModel {
    #[serde(rename = "type")]
    kind: u8,
    #[serde_as(as = "Option<Base64>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uint: Option<u64>,
}

impl TryFrom<TealValueModel> for TealValue {
    type Error = TypesError;

    fn try_from(model: TealValueModel) -> Result<Self, Self::Error> {
        match model.kind {
            TYPE_BYTES => Ok(Self::Bytes(model.bytes.unwrap_or_default())),
            TYPE_UINT => Ok(Self::Uint(model.uint.unwrap_or_default())),
            other => Err(TypesError::InvalidValue(format!("unknown type tag {other}"))),
        }
    }
}

impl From<TealValue> for TealValueModel {
    fn from(value: TealValue) -> Self {
        match value {
            TealValue::Bytes(bytes) => Self {
                kind: TYPE_BYTES,
                bytes: Some(bytes),
                uint: None,
            },
            TealValue::Uint(uint) => Self {
                kind: TYPE_UINT,
                bytes: None,
                uint: Some(uint),
            },
        }
    }
}

/// A key together with its stored value, as found in application state.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TealKeyValue {
    /// Raw key bytes (base64 on the wire).
    #[serde_as(as = "Base64")]
    pub key: Vec<u8>,
    /// Stored value.
    pub value: TealValue,
}

impl TealKeyValue {
    /// Creates a key/value pair.
    pub fn new(key: impl AsRef<[u8]>, value: impl Into<TealValue>) -> Self {
        Self {
            key: key.as_ref().to_vec(),
            value: value.into(),
        }
    }
}

// =============================================================================
// STATE SCHEMA
// =============================================================================

/// Number of integer and byte-string entries reserved in one state store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StateSchema {
    /// Integer entries.
    #[serde(default)]
    pub num_uint: u64,
    /// Byte-string entries.
    #[serde(default)]
    pub num_byte_slice: u64,
}

impl StateSchema {
    /// Creates a schema.
    #[must_use]
    pub const fn new(num_uint: u64, num_byte_slice: u64) -> Self {
        Self {
            num_uint,
            num_byte_slice,
        }
    }

    /// Total number of entries.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.num_uint.saturating_add(self.num_byte_slice)
    }
}

/// Schema as encoded inside a transaction (`nui` / `nbs`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub(crate) struct TxnSchema {
    #[serde(default, skip_serializing_if = "is_zero")]
    nui: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    nbs: u64,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(value: &u64) -> bool {
    *value == 0
}

impl From<StateSchema> for TxnSchema {
    fn from(schema: StateSchema) -> Self {
        Self {
            nui: schema.num_uint,
            nbs: schema.num_byte_slice,
        }
    }
}

impl From<TxnSchema> for StateSchema {
    fn from(schema: TxnSchema) -> Self {
        Self::new(schema.nui, schema.nbs)
    }
}
