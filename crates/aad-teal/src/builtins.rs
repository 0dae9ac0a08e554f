//! # Builtin Namespaces
//!
//! Shorthand constructors for transaction fields, global fields and
//! application state opcodes.

use crate::expr::{Expr, StateOp};
use crate::fields::{GlobalField, TxnArrayField, TxnField};
use crate::scratch::MaybeValue;
use crate::types::TealType;

/// Fields of the current transaction.
pub struct Txn;

impl Txn {
    #[must_use]
    pub fn sender() -> Expr {
        Expr::Txn(TxnField::Sender)
    }

    #[must_use]
    pub fn fee() -> Expr {
        Expr::Txn(TxnField::Fee)
    }

    #[must_use]
    pub fn note() -> Expr {
        Expr::Txn(TxnField::Note)
    }

    #[must_use]
    pub fn lease() -> Expr {
        Expr::Txn(TxnField::Lease)
    }

    #[must_use]
    pub fn group_index() -> Expr {
        Expr::Txn(TxnField::GroupIndex)
    }

    #[must_use]
    pub fn application_id() -> Expr {
        Expr::Txn(TxnField::ApplicationId)
    }

    #[must_use]
    pub fn on_completion() -> Expr {
        Expr::Txn(TxnField::OnCompletion)
    }

    #[must_use]
    pub fn rekey_to() -> Expr {
        Expr::Txn(TxnField::RekeyTo)
    }

    /// `txna ApplicationArgs index`.
    #[must_use]
    pub fn application_args(index: u8) -> Expr {
        Expr::TxnArray(TxnArrayField::ApplicationArgs, index)
    }

    /// Number of application arguments.
    #[must_use]
    pub fn num_app_args() -> Expr {
        Expr::Txn(TxnField::NumAppArgs)
    }

    /// `txna Accounts index`. Index 0 is the sender.
    #[must_use]
    pub fn accounts(index: u8) -> Expr {
        Expr::TxnArray(TxnArrayField::Accounts, index)
    }

    #[must_use]
    pub fn num_accounts() -> Expr {
        Expr::Txn(TxnField::NumAccounts)
    }

    /// `txna Applications index`. Index 0 is the called application.
    #[must_use]
    pub fn applications(index: u8) -> Expr {
        Expr::TxnArray(TxnArrayField::Applications, index)
    }
}

/// Global fields.
pub struct Global;

impl Global {
    #[must_use]
    pub fn min_txn_fee() -> Expr {
        Expr::Global(GlobalField::MinTxnFee)
    }

    #[must_use]
    pub fn zero_address() -> Expr {
        Expr::Global(GlobalField::ZeroAddress)
    }

    #[must_use]
    pub fn group_size() -> Expr {
        Expr::Global(GlobalField::GroupSize)
    }

    #[must_use]
    pub fn round() -> Expr {
        Expr::Global(GlobalField::Round)
    }

    #[must_use]
    pub fn latest_timestamp() -> Expr {
        Expr::Global(GlobalField::LatestTimestamp)
    }

    #[must_use]
    pub fn current_application_id() -> Expr {
        Expr::Global(GlobalField::CurrentApplicationId)
    }

    #[must_use]
    pub fn creator_address() -> Expr {
        Expr::Global(GlobalField::CreatorAddress)
    }

    #[must_use]
    pub fn current_application_address() -> Expr {
        Expr::Global(GlobalField::CurrentApplicationAddress)
    }
}

/// Application state opcodes. Keys accept anything convertible to an
/// expression, so `App::global_get("counter")` reads key `b"counter"`.
pub struct App;

impl App {
    /// Reads the current app's global `key`. The result is untyped.
    #[must_use]
    pub fn global_get(key: impl Into<Expr>) -> Expr {
        Expr::State(StateOp::GlobalGet {
            key: Box::new(key.into()),
            value_type: TealType::Any,
        })
    }

    /// Writes the current app's global `key`.
    #[must_use]
    pub fn global_put(key: impl Into<Expr>, value: Expr) -> Expr {
        Expr::State(StateOp::GlobalPut {
            key: Box::new(key.into()),
            value: Box::new(value),
        })
    }

    /// Deletes the current app's global `key`.
    #[must_use]
    pub fn global_del(key: impl Into<Expr>) -> Expr {
        Expr::State(StateOp::GlobalDel {
            key: Box::new(key.into()),
        })
    }

    /// Reads `key` from `app`'s global state, with an existence flag.
    #[must_use]
    pub fn global_get_ex(app: Expr, key: impl Into<Expr>) -> MaybeValue {
        MaybeValue::new(
            StateOp::GlobalGetEx {
                app: Box::new(app),
                key: Box::new(key.into()),
            },
            TealType::Any,
        )
    }

    /// Reads `account`'s local `key` for the current app. The result is untyped.
    #[must_use]
    pub fn local_get(account: Expr, key: impl Into<Expr>) -> Expr {
        Expr::State(StateOp::LocalGet {
            account: Box::new(account),
            key: Box::new(key.into()),
            value_type: TealType::Any,
        })
    }

    /// Writes `account`'s local `key` for the current app.
    #[must_use]
    pub fn local_put(account: Expr, key: impl Into<Expr>, value: Expr) -> Expr {
        Expr::State(StateOp::LocalPut {
            account: Box::new(account),
            key: Box::new(key.into()),
            value: Box::new(value),
        })
    }

    /// Deletes `account`'s local `key` for the current app.
    #[must_use]
    pub fn local_del(account: Expr, key: impl Into<Expr>) -> Expr {
        Expr::State(StateOp::LocalDel {
            account: Box::new(account),
            key: Box::new(key.into()),
        })
    }

    /// Reads `key` from `account`'s local state for `app`, with an existence flag.
    #[must_use]
    pub fn local_get_ex(account: Expr, app: Expr, key: impl Into<Expr>) -> MaybeValue {
        MaybeValue::new(
            StateOp::LocalGetEx {
                account: Box::new(account),
                app: Box::new(app),
                key: Box::new(key.into()),
            },
            TealType::Any,
        )
    }

    /// Whether `account` has opted into `app`.
    #[must_use]
    pub fn opted_in(account: Expr, app: Expr) -> Expr {
        Expr::State(StateOp::OptedIn {
            account: Box::new(account),
            app: Box::new(app),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_txn_fields() {
        assert_eq!(Txn::sender(), Expr::Txn(TxnField::Sender));
        assert_eq!(
            Txn::application_args(0),
            Expr::TxnArray(TxnArrayField::ApplicationArgs, 0)
        );
    }

    #[test]
    fn test_app_keys_from_text() {
        assert_eq!(
            App::global_del("counter"),
            Expr::State(StateOp::GlobalDel {
                key: Box::new(Expr::Bytes(b"counter".to_vec()))
            })
        );
    }

    #[test]
    fn test_get_ex_allocates_fresh_slots() {
        let a = App::global_get_ex(Expr::int(0), "k");
        let b = App::global_get_ex(Expr::int(0), "k");
        assert_ne!(a.value_slot(), b.value_slot());
        assert_eq!(a.op(), b.op());
    }
}
