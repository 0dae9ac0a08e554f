//! # State Keys
//!
//! A [`KeyInfo`] ties a key to its value type and optional default. A
//! [`KeySet`] is the ordered, duplicate-free collection a state owns.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use aad_teal::{Expr, TealType};
use aad_types::StateSchema;

use crate::domain::invariants::check_key_length;
use crate::errors::AppError;

// =============================================================================
// STATE KEY
// =============================================================================

/// Raw bytes of a state key, at most 64 long.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey(Vec<u8>);

impl StateKey {
    /// Validates and wraps `key`.
    ///
    /// # Errors
    ///
    /// * `InvalidKey` - the key is longer than 64 bytes
    pub fn new(key: impl AsRef<[u8]>) -> Result<Self, AppError> {
        let key = key.as_ref();
        check_key_length(key, &display_key(key))?;
        Ok(Self(key.to_vec()))
    }

    /// A one-byte key holding `index`.
    #[must_use]
    pub fn from_index(index: u8) -> Self {
        Self(vec![index])
    }

    /// The key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The key as a byte-string constant.
    #[must_use]
    pub fn to_expr(&self) -> Expr {
        Expr::Bytes(self.0.clone())
    }
}

impl Borrow<[u8]> for StateKey {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for StateKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&display_key(&self.0))
    }
}

impl fmt::Debug for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateKey({})", display_key(&self.0))
    }
}

/// Printable keys as text, anything else as hex.
pub(crate) fn display_key(key: &[u8]) -> String {
    match std::str::from_utf8(key) {
        Ok(text) if !text.is_empty() && text.chars().all(|c| !c.is_control()) => text.to_string(),
        _ => format!("0x{}", hex::encode(key)),
    }
}

// =============================================================================
// KEY INFO
// =============================================================================

/// One declared state key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    key: StateKey,
    value_type: TealType,
    default: Option<Expr>,
}

impl KeyInfo {
    /// Declares `key` holding values of `value_type`.
    ///
    /// # Errors
    ///
    /// * `InvalidKey` - the key is too long, or `value_type` is not `Uint64` or `Bytes`
    pub fn new(key: impl AsRef<[u8]>, value_type: TealType) -> Result<Self, AppError> {
        let key = StateKey::new(key)?;
        if !value_type.is_value() {
            return Err(AppError::InvalidKey {
                key: key.to_string(),
                reason: format!("values must be uint64 or bytes, not {value_type}"),
            });
        }
        Ok(Self {
            key,
            value_type,
            default: None,
        })
    }

    /// Declares an integer key.
    ///
    /// # Errors
    ///
    /// See [`KeyInfo::new`].
    pub fn uint(key: impl AsRef<[u8]>) -> Result<Self, AppError> {
        Self::new(key, TealType::Uint64)
    }

    /// Declares a byte-string key.
    ///
    /// # Errors
    ///
    /// See [`KeyInfo::new`].
    pub fn bytes(key: impl AsRef<[u8]>) -> Result<Self, AppError> {
        Self::new(key, TealType::Bytes)
    }

    /// Declares a one-byte key holding `index`.
    ///
    /// # Errors
    ///
    /// See [`KeyInfo::new`].
    pub fn indexed(index: u8, value_type: TealType) -> Result<Self, AppError> {
        Self::new(StateKey::from_index(index), value_type)
    }

    /// Sets the value written when the state is initialized.
    ///
    /// # Errors
    ///
    /// * `TypeMismatch` - `default` does not produce a value of the key's type
    pub fn with_default(mut self, default: Expr) -> Result<Self, AppError> {
        check_value_type(&self, &default)?;
        self.default = Some(default);
        Ok(self)
    }

    /// The key.
    #[must_use]
    pub fn key(&self) -> &StateKey {
        &self.key
    }

    /// The declared value type.
    #[must_use]
    pub const fn value_type(&self) -> TealType {
        self.value_type
    }

    /// The default value, if any.
    #[must_use]
    pub fn default(&self) -> Option<&Expr> {
        self.default.as_ref()
    }
}

/// Fails unless `value` may be stored under `info`. Untyped values pass.
pub(crate) fn check_value_type(info: &KeyInfo, value: &Expr) -> Result<(), AppError> {
    let actual = value.type_of();
    if actual == TealType::Any || actual == info.value_type {
        return Ok(());
    }
    Err(AppError::TypeMismatch {
        key: info.key.to_string(),
        expected: info.value_type,
        actual,
    })
}

// =============================================================================
// KEY SET
// =============================================================================

/// Declared keys in declaration order, indexed by key bytes.
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    infos: Vec<KeyInfo>,
    positions: HashMap<StateKey, usize>,
}

impl KeySet {
    /// Collects `infos`, keeping declaration order.
    ///
    /// # Errors
    ///
    /// * `DuplicateKey` - two infos share a key
    pub fn new(infos: impl IntoIterator<Item = KeyInfo>) -> Result<Self, AppError> {
        let mut set = Self::default();
        for info in infos {
            if set.positions.contains_key(&info.key) {
                return Err(AppError::DuplicateKey {
                    key: info.key.to_string(),
                });
            }
            set.positions.insert(info.key.clone(), set.infos.len());
            set.infos.push(info);
        }
        Ok(set)
    }

    /// Looks up a key, returning its declaration position and info.
    ///
    /// # Errors
    ///
    /// * `UnknownKey` - the key is not declared
    pub fn lookup(&self, key: &[u8]) -> Result<(usize, &KeyInfo), AppError> {
        self.positions
            .get(key)
            .map(|position| (*position, &self.infos[*position]))
            .ok_or_else(|| AppError::UnknownKey {
                key: display_key(key),
            })
    }

    /// Returns true if `key` is declared.
    #[must_use]
    pub fn contains(&self, key: &[u8]) -> bool {
        self.positions.contains_key(key)
    }

    /// Infos in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &KeyInfo> {
        self.infos.iter()
    }

    /// Number of declared keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    /// Returns true if no keys are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Entries to reserve for these keys.
    #[must_use]
    pub fn schema(&self) -> StateSchema {
        self.infos
            .iter()
            .fold(StateSchema::default(), |mut schema, info| {
                match info.value_type {
                    TealType::Uint64 => schema.num_uint += 1,
                    _ => schema.num_byte_slice += 1,
                }
                schema
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_key_display() {
        assert_eq!(StateKey::new("counter").unwrap().to_string(), "counter");
        assert_eq!(StateKey::from_index(3).to_string(), "0x03");
        assert_eq!(StateKey::new([0xffu8, 0x00]).unwrap().to_string(), "0xff00");
    }

    #[test]
    fn test_key_too_long() {
        let key = "k".repeat(65);
        assert!(matches!(
            KeyInfo::uint(key),
            Err(AppError::InvalidKey { .. })
        ));
        assert!(KeyInfo::uint("k".repeat(64)).is_ok());
    }

    #[test]
    fn test_key_type_must_be_value() {
        assert!(matches!(
            KeyInfo::new("k", TealType::Any),
            Err(AppError::InvalidKey { .. })
        ));
        assert!(KeyInfo::new("k", TealType::None).is_err());
    }

    #[test]
    fn test_default_type_checked() {
        let info = KeyInfo::uint("counter")
            .unwrap()
            .with_default(Expr::int(0))
            .unwrap();
        assert_eq!(info.default(), Some(&Expr::int(0)));

        assert_eq!(
            KeyInfo::uint("counter")
                .unwrap()
                .with_default(Expr::bytes("zero")),
            Err(AppError::TypeMismatch {
                key: "counter".into(),
                expected: TealType::Uint64,
                actual: TealType::Bytes,
            })
        );
    }

    #[test]
    fn test_key_set_order_and_lookup() {
        let set = KeySet::new([
            KeyInfo::bytes("name").unwrap(),
            KeyInfo::uint("count").unwrap(),
            KeyInfo::indexed(7, TealType::Uint64).unwrap(),
        ])
        .unwrap();

        let keys: Vec<String> = set.iter().map(|info| info.key().to_string()).collect();
        assert_eq!(keys, vec!["name", "count", "0x07"]);
        assert_eq!(set.lookup(b"count").unwrap().0, 1);
        assert_eq!(set.lookup(&[7]).unwrap().0, 2);
        assert_eq!(
            set.lookup(b"missing").unwrap_err(),
            AppError::UnknownKey {
                key: "missing".into()
            }
        );
        assert_eq!(set.schema(), StateSchema::new(2, 1));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let result = KeySet::new([KeyInfo::uint("a").unwrap(), KeyInfo::bytes("a").unwrap()]);
        assert_eq!(
            result.unwrap_err(),
            AppError::DuplicateKey { key: "a".into() }
        );
    }

    proptest! {
        #[test]
        fn prop_schema_counts_declared_types(types in proptest::collection::vec(any::<bool>(), 0..40)) {
            let infos: Vec<KeyInfo> = types
                .iter()
                .enumerate()
                .map(|(i, is_uint)| {
                    let value_type = if *is_uint { TealType::Uint64 } else { TealType::Bytes };
                    KeyInfo::new(format!("key{i}"), value_type).unwrap()
                })
                .collect();
            let set = KeySet::new(infos.clone()).unwrap();
            let again = KeySet::new(infos).unwrap();

            let uints = types.iter().filter(|is_uint| **is_uint).count() as u64;
            prop_assert_eq!(set.schema(), StateSchema::new(uints, types.len() as u64 - uints));
            prop_assert_eq!(set.schema(), again.schema());
        }
    }
}
