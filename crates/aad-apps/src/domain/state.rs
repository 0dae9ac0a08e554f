//! # Application State
//!
//! The [`State`] trait renders read, write and existence-check expressions
//! for a set of declared keys. Four variants differ in which store they
//! address and whether they may write:
//!
//! | Variant | Store | Account | Writable |
//! |---------|-------|---------|----------|
//! | [`StateGlobal`] | current app, global | - | yes |
//! | [`StateLocal`] | current app, local | sender or explicit | yes |
//! | [`StateGlobalExternal`] | any app, global | - | no |
//! | [`StateLocalExternal`] | any app, local | explicit | no |
//!
//! Every variant allocates one [`MaybeValue`] per key when constructed, so
//! repeated [`State::get_ex`] calls for a key share the same scratch slots.

use std::fmt;

use aad_teal::{Expr, MaybeValue, StateOp, TealType, Txn};
use aad_types::StateSchema;

use crate::domain::key_info::{check_value_type, KeyInfo, KeySet, StateKey};
use crate::errors::AppError;

/// Capabilities shared by every state variant.
pub trait State: Send + Sync + fmt::Debug {
    /// The declared keys.
    fn key_set(&self) -> &KeySet;

    /// Expression reading the value declared by `info` at `position`.
    fn read(&self, info: &KeyInfo, position: usize) -> Expr;

    /// Expression writing `value` under `info`'s key.
    ///
    /// # Errors
    ///
    /// * `ReadOnlyState` - the variant cannot write
    fn write(&self, info: &KeyInfo, value: Expr) -> Result<Expr, AppError>;

    /// Expression deleting `info`'s key.
    ///
    /// # Errors
    ///
    /// * `ReadOnlyState` - the variant cannot write
    fn remove(&self, info: &KeyInfo) -> Result<Expr, AppError>;

    /// The `MaybeValue` allocated for the key at `position`.
    fn maybe_value(&self, position: usize) -> &MaybeValue;

    /// Looks up a declared key.
    ///
    /// # Errors
    ///
    /// * `UnknownKey` - the key is not declared
    fn key_info(&self, key: impl AsRef<[u8]>) -> Result<&KeyInfo, AppError>
    where
        Self: Sized,
    {
        self.key_set().lookup(key.as_ref()).map(|(_, info)| info)
    }

    /// Reads `key`.
    ///
    /// # Errors
    ///
    /// * `UnknownKey` - the key is not declared
    fn get(&self, key: impl AsRef<[u8]>) -> Result<Expr, AppError>
    where
        Self: Sized,
    {
        let (position, info) = self.key_set().lookup(key.as_ref())?;
        Ok(self.read(info, position))
    }

    /// Writes `value` under `key`. Untyped values are accepted.
    ///
    /// # Errors
    ///
    /// * `UnknownKey` - the key is not declared
    /// * `TypeMismatch` - `value` has the wrong type
    /// * `ReadOnlyState` - the variant cannot write
    fn set(&self, key: impl AsRef<[u8]>, value: Expr) -> Result<Expr, AppError>
    where
        Self: Sized,
    {
        let (_, info) = self.key_set().lookup(key.as_ref())?;
        check_value_type(info, &value)?;
        self.write(info, value)
    }

    /// Deletes `key`.
    ///
    /// # Errors
    ///
    /// * `UnknownKey` - the key is not declared
    /// * `ReadOnlyState` - the variant cannot write
    fn delete(&self, key: impl AsRef<[u8]>) -> Result<Expr, AppError>
    where
        Self: Sized,
    {
        let (_, info) = self.key_set().lookup(key.as_ref())?;
        self.remove(info)
    }

    /// The cached `MaybeValue` for `key`. Run its `store()` before reading
    /// `value()` or `has_value()`.
    ///
    /// # Errors
    ///
    /// * `UnknownKey` - the key is not declared
    fn get_ex(&self, key: impl AsRef<[u8]>) -> Result<MaybeValue, AppError>
    where
        Self: Sized,
    {
        let (position, _) = self.key_set().lookup(key.as_ref())?;
        Ok(self.maybe_value(position).clone())
    }

    /// Expression yielding 1 if `key` holds a value, else 0.
    ///
    /// # Errors
    ///
    /// * `UnknownKey` - the key is not declared
    fn exists(&self, key: impl AsRef<[u8]>) -> Result<Expr, AppError>
    where
        Self: Sized,
    {
        Ok(self.get_ex(key)?.load_has_value())
    }

    /// Expression loading `key` through its `MaybeValue`. Yields the zero
    /// value of the type if the key is unset.
    ///
    /// # Errors
    ///
    /// * `UnknownKey` - the key is not declared
    fn load_ex_value(&self, key: impl AsRef<[u8]>) -> Result<Expr, AppError>
    where
        Self: Sized,
    {
        Ok(self.get_ex(key)?.load_value())
    }

    /// Number of declared keys.
    fn key_count(&self) -> usize {
        self.key_set().len()
    }

    /// Declared keys with their value types, in declaration order.
    fn value_types(&self) -> Vec<(StateKey, TealType)> {
        self.key_set()
            .iter()
            .map(|info| (info.key().clone(), info.value_type()))
            .collect()
    }

    /// Entries to reserve for this state.
    fn schema(&self) -> StateSchema {
        self.key_set().schema()
    }

    /// Keys with defaults, paired with their default, in declaration order.
    fn defaults(&self) -> Vec<(&StateKey, &Expr)> {
        self.key_set()
            .iter()
            .filter_map(|info| info.default().map(|default| (info.key(), default)))
            .collect()
    }

    /// Writes every default once, in declaration order.
    ///
    /// # Errors
    ///
    /// * `ReadOnlyState` - the variant cannot write and some key has a default
    fn constructor(&self) -> Result<Expr, AppError> {
        let mut writes = Vec::new();
        for info in self.key_set().iter() {
            if let Some(default) = info.default() {
                writes.push(self.write(info, default.clone())?);
            }
        }
        Ok(Expr::Seq(writes))
    }
}

fn read_only(info: &KeyInfo) -> AppError {
    AppError::ReadOnlyState {
        key: info.key().to_string(),
    }
}

fn allocate_maybes(keys: &KeySet, op: impl Fn(&KeyInfo) -> StateOp) -> Vec<MaybeValue> {
    keys.iter()
        .map(|info| MaybeValue::new(op(info), info.value_type()))
        .collect()
}

// =============================================================================
// GLOBAL
// =============================================================================

/// The current application's global state.
#[derive(Debug, Clone)]
pub struct StateGlobal {
    keys: KeySet,
    maybes: Vec<MaybeValue>,
}

impl StateGlobal {
    /// Declares global state.
    ///
    /// # Errors
    ///
    /// * `DuplicateKey` - two infos share a key
    pub fn new(infos: impl IntoIterator<Item = KeyInfo>) -> Result<Self, AppError> {
        let keys = KeySet::new(infos)?;
        let maybes = allocate_maybes(&keys, |info| StateOp::GlobalGetEx {
            app: Box::new(Expr::int(0)),
            key: Box::new(info.key().to_expr()),
        });
        Ok(Self { keys, maybes })
    }
}

impl State for StateGlobal {
    fn key_set(&self) -> &KeySet {
        &self.keys
    }

    fn read(&self, info: &KeyInfo, _position: usize) -> Expr {
        Expr::State(StateOp::GlobalGet {
            key: Box::new(info.key().to_expr()),
            value_type: info.value_type(),
        })
    }

    fn write(&self, info: &KeyInfo, value: Expr) -> Result<Expr, AppError> {
        Ok(Expr::State(StateOp::GlobalPut {
            key: Box::new(info.key().to_expr()),
            value: Box::new(value),
        }))
    }

    fn remove(&self, info: &KeyInfo) -> Result<Expr, AppError> {
        Ok(Expr::State(StateOp::GlobalDel {
            key: Box::new(info.key().to_expr()),
        }))
    }

    fn maybe_value(&self, position: usize) -> &MaybeValue {
        &self.maybes[position]
    }
}

// =============================================================================
// LOCAL
// =============================================================================

/// The current application's local state of one account.
#[derive(Debug, Clone)]
pub struct StateLocal {
    keys: KeySet,
    account: Expr,
    maybes: Vec<MaybeValue>,
}

impl StateLocal {
    /// Declares local state of the transaction sender.
    ///
    /// # Errors
    ///
    /// * `DuplicateKey` - two infos share a key
    pub fn new(infos: impl IntoIterator<Item = KeyInfo>) -> Result<Self, AppError> {
        Self::for_account(infos, Txn::sender())
    }

    /// Declares local state of the account `account` evaluates to.
    ///
    /// # Errors
    ///
    /// * `DuplicateKey` - two infos share a key
    pub fn for_account(
        infos: impl IntoIterator<Item = KeyInfo>,
        account: Expr,
    ) -> Result<Self, AppError> {
        let keys = KeySet::new(infos)?;
        let maybes = allocate_maybes(&keys, |info| StateOp::LocalGetEx {
            account: Box::new(account.clone()),
            app: Box::new(Expr::int(0)),
            key: Box::new(info.key().to_expr()),
        });
        Ok(Self {
            keys,
            account,
            maybes,
        })
    }

    /// The same keys, addressed to another account. Fresh slots are
    /// allocated for the new account.
    #[must_use]
    pub fn with_account(&self, account: Expr) -> Self {
        let maybes = allocate_maybes(&self.keys, |info| StateOp::LocalGetEx {
            account: Box::new(account.clone()),
            app: Box::new(Expr::int(0)),
            key: Box::new(info.key().to_expr()),
        });
        Self {
            keys: self.keys.clone(),
            account,
            maybes,
        }
    }

    /// The account expression.
    #[must_use]
    pub fn account(&self) -> &Expr {
        &self.account
    }
}

impl State for StateLocal {
    fn key_set(&self) -> &KeySet {
        &self.keys
    }

    fn read(&self, info: &KeyInfo, _position: usize) -> Expr {
        Expr::State(StateOp::LocalGet {
            account: Box::new(self.account.clone()),
            key: Box::new(info.key().to_expr()),
            value_type: info.value_type(),
        })
    }

    fn write(&self, info: &KeyInfo, value: Expr) -> Result<Expr, AppError> {
        Ok(Expr::State(StateOp::LocalPut {
            account: Box::new(self.account.clone()),
            key: Box::new(info.key().to_expr()),
            value: Box::new(value),
        }))
    }

    fn remove(&self, info: &KeyInfo) -> Result<Expr, AppError> {
        Ok(Expr::State(StateOp::LocalDel {
            account: Box::new(self.account.clone()),
            key: Box::new(info.key().to_expr()),
        }))
    }

    fn maybe_value(&self, position: usize) -> &MaybeValue {
        &self.maybes[position]
    }
}

// =============================================================================
// EXTERNAL
// =============================================================================

/// Global state of any application, read through `app_global_get_ex`.
#[derive(Debug, Clone)]
pub struct StateGlobalExternal {
    keys: KeySet,
    app: Expr,
    maybes: Vec<MaybeValue>,
}

impl StateGlobalExternal {
    /// Declares the global state of the app `app` evaluates to (an id, or an
    /// index into the call's foreign apps).
    ///
    /// # Errors
    ///
    /// * `DuplicateKey` - two infos share a key
    pub fn new(infos: impl IntoIterator<Item = KeyInfo>, app: Expr) -> Result<Self, AppError> {
        let keys = KeySet::new(infos)?;
        let maybes = allocate_maybes(&keys, |info| StateOp::GlobalGetEx {
            app: Box::new(app.clone()),
            key: Box::new(info.key().to_expr()),
        });
        Ok(Self { keys, app, maybes })
    }

    /// The application expression.
    #[must_use]
    pub fn app(&self) -> &Expr {
        &self.app
    }
}

impl State for StateGlobalExternal {
    fn key_set(&self) -> &KeySet {
        &self.keys
    }

    fn read(&self, _info: &KeyInfo, position: usize) -> Expr {
        self.maybes[position].load_value()
    }

    fn write(&self, info: &KeyInfo, _value: Expr) -> Result<Expr, AppError> {
        Err(read_only(info))
    }

    fn remove(&self, info: &KeyInfo) -> Result<Expr, AppError> {
        Err(read_only(info))
    }

    fn maybe_value(&self, position: usize) -> &MaybeValue {
        &self.maybes[position]
    }
}

/// Local state of an account for any application, read through
/// `app_local_get_ex`.
#[derive(Debug, Clone)]
pub struct StateLocalExternal {
    keys: KeySet,
    app: Expr,
    account: Expr,
    maybes: Vec<MaybeValue>,
}

impl StateLocalExternal {
    /// Declares the local state `account` holds for `app`.
    ///
    /// # Errors
    ///
    /// * `DuplicateKey` - two infos share a key
    pub fn new(
        infos: impl IntoIterator<Item = KeyInfo>,
        app: Expr,
        account: Expr,
    ) -> Result<Self, AppError> {
        let keys = KeySet::new(infos)?;
        let maybes = allocate_maybes(&keys, |info| StateOp::LocalGetEx {
            account: Box::new(account.clone()),
            app: Box::new(app.clone()),
            key: Box::new(info.key().to_expr()),
        });
        Ok(Self {
            keys,
            app,
            account,
            maybes,
        })
    }

    /// The application expression.
    #[must_use]
    pub fn app(&self) -> &Expr {
        &self.app
    }

    /// The account expression.
    #[must_use]
    pub fn account(&self) -> &Expr {
        &self.account
    }
}

impl State for StateLocalExternal {
    fn key_set(&self) -> &KeySet {
        &self.keys
    }

    fn read(&self, _info: &KeyInfo, position: usize) -> Expr {
        self.maybes[position].load_value()
    }

    fn write(&self, info: &KeyInfo, _value: Expr) -> Result<Expr, AppError> {
        Err(read_only(info))
    }

    fn remove(&self, info: &KeyInfo) -> Result<Expr, AppError> {
        Err(read_only(info))
    }

    fn maybe_value(&self, position: usize) -> &MaybeValue {
        &self.maybes[position]
    }
}
