//! # Logic Expressions
//!
//! An expression tree describing program logic. Every node has a static
//! [`TealType`]; the compiler checks operand types as it emits source.
//!
//! Arithmetic, comparison and bitwise operators are available through the
//! usual `std::ops` traits and the comparison methods on [`Expr`]:
//!
//! ```ignore
//! let next = App::global_get("counter") + Expr::int(1);
//! let ok = Txn::num_app_args().ge(Expr::int(1));
//! ```

use std::ops;

use aad_types::{Address, OnComplete};

use crate::fields::{GlobalField, TxnArrayField, TxnField};
use crate::scratch::{MaybeValue, ScratchSlot};
use crate::types::TealType;

// =============================================================================
// OPERATORS
// =============================================================================

/// Operators taking one operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Logical not (`!`).
    Not,
    /// Byte-string length (`len`).
    Len,
    /// Integer to 8 big-endian bytes (`itob`).
    Itob,
    /// Big-endian bytes to integer (`btoi`).
    Btoi,
}

impl UnaryOp {
    /// Opcode mnemonic.
    #[must_use]
    pub const fn opcode(self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::Len => "len",
            Self::Itob => "itob",
            Self::Btoi => "btoi",
        }
    }

    /// Required operand type.
    #[must_use]
    pub const fn operand_type(self) -> TealType {
        match self {
            Self::Not | Self::Itob => TealType::Uint64,
            Self::Len | Self::Btoi => TealType::Bytes,
        }
    }

    /// Result type.
    #[must_use]
    pub const fn result_type(self) -> TealType {
        match self {
            Self::Itob => TealType::Bytes,
            _ => TealType::Uint64,
        }
    }
}

/// Operators taking two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Minus,
    Mul,
    Div,
    Mod,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Neq,
    BitAnd,
    BitOr,
    Concat,
}

impl BinaryOp {
    /// Opcode mnemonic.
    #[must_use]
    pub const fn opcode(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Minus => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Neq => "!=",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::Concat => "concat",
        }
    }

    /// Required operand type. `Any` means both operands must agree.
    #[must_use]
    pub const fn operand_type(self) -> TealType {
        match self {
            Self::Eq | Self::Neq => TealType::Any,
            Self::Concat => TealType::Bytes,
            _ => TealType::Uint64,
        }
    }

    /// Result type.
    #[must_use]
    pub const fn result_type(self) -> TealType {
        match self {
            Self::Concat => TealType::Bytes,
            _ => TealType::Uint64,
        }
    }
}

/// Short-circuit-free logical operators over one or more operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    /// Opcode mnemonic.
    #[must_use]
    pub const fn opcode(self) -> &'static str {
        match self {
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

// =============================================================================
// STATE OPCODES
// =============================================================================

/// Application state opcodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateOp {
    /// `app_global_get`: read the current app's global state.
    GlobalGet { key: Box<Expr>, value_type: TealType },
    /// `app_global_put`.
    GlobalPut { key: Box<Expr>, value: Box<Expr> },
    /// `app_global_del`.
    GlobalDel { key: Box<Expr> },
    /// `app_global_get_ex`: read any app's global state, pushing a flag.
    GlobalGetEx { app: Box<Expr>, key: Box<Expr> },
    /// `app_local_get`: read an account's local state for the current app.
    LocalGet {
        account: Box<Expr>,
        key: Box<Expr>,
        value_type: TealType,
    },
    /// `app_local_put`.
    LocalPut {
        account: Box<Expr>,
        key: Box<Expr>,
        value: Box<Expr>,
    },
    /// `app_local_del`.
    LocalDel { account: Box<Expr>, key: Box<Expr> },
    /// `app_local_get_ex`: read an account's local state for any app.
    LocalGetEx {
        account: Box<Expr>,
        app: Box<Expr>,
        key: Box<Expr>,
    },
    /// `app_opted_in`.
    OptedIn { account: Box<Expr>, app: Box<Expr> },
}

impl StateOp {
    /// Opcode mnemonic.
    #[must_use]
    pub const fn opcode(&self) -> &'static str {
        match self {
            Self::GlobalGet { .. } => "app_global_get",
            Self::GlobalPut { .. } => "app_global_put",
            Self::GlobalDel { .. } => "app_global_del",
            Self::GlobalGetEx { .. } => "app_global_get_ex",
            Self::LocalGet { .. } => "app_local_get",
            Self::LocalPut { .. } => "app_local_put",
            Self::LocalDel { .. } => "app_local_del",
            Self::LocalGetEx { .. } => "app_local_get_ex",
            Self::OptedIn { .. } => "app_opted_in",
        }
    }

    /// Operands in stack order, each with the type it must have.
    #[must_use]
    pub fn operands(&self) -> Vec<(&Expr, TealType)> {
        match self {
            Self::GlobalGet { key, .. } | Self::GlobalDel { key } => {
                vec![(key.as_ref(), TealType::Bytes)]
            }
            Self::GlobalPut { key, value } => vec![
                (key.as_ref(), TealType::Bytes),
                (value.as_ref(), TealType::Any),
            ],
            Self::GlobalGetEx { app, key } => vec![
                (app.as_ref(), TealType::Uint64),
                (key.as_ref(), TealType::Bytes),
            ],
            Self::LocalGet { account, key, .. } | Self::LocalDel { account, key } => vec![
                (account.as_ref(), TealType::Any),
                (key.as_ref(), TealType::Bytes),
            ],
            Self::LocalPut {
                account,
                key,
                value,
            } => vec![
                (account.as_ref(), TealType::Any),
                (key.as_ref(), TealType::Bytes),
                (value.as_ref(), TealType::Any),
            ],
            Self::LocalGetEx { account, app, key } => vec![
                (account.as_ref(), TealType::Any),
                (app.as_ref(), TealType::Uint64),
                (key.as_ref(), TealType::Bytes),
            ],
            Self::OptedIn { account, app } => vec![
                (account.as_ref(), TealType::Any),
                (app.as_ref(), TealType::Uint64),
            ],
        }
    }

    /// Type left on the stack. The `*_get_ex` opcodes leave two values and
    /// are only usable through [`MaybeValue`].
    #[must_use]
    pub const fn result_type(&self) -> TealType {
        match self {
            Self::GlobalGet { value_type, .. } | Self::LocalGet { value_type, .. } => *value_type,
            Self::OptedIn { .. } => TealType::Uint64,
            _ => TealType::None,
        }
    }

    /// Returns true for the opcodes that push a value and a flag.
    #[must_use]
    pub const fn is_maybe(&self) -> bool {
        matches!(self, Self::GlobalGetEx { .. } | Self::LocalGetEx { .. })
    }
}

// =============================================================================
// EXPRESSIONS
// =============================================================================

/// A program expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Integer constant.
    Int(u64),
    /// Byte-string constant.
    Bytes(Vec<u8>),
    /// Address constant (32 bytes at run time).
    Addr(Address),
    /// Named on-completion constant.
    OnComplete(OnComplete),
    /// Scalar transaction field.
    Txn(TxnField),
    /// Element of a transaction array field.
    TxnArray(TxnArrayField, u8),
    /// Global field.
    Global(GlobalField),
    /// Unary operator.
    Unary(UnaryOp, Box<Expr>),
    /// Binary operator.
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// Logical operator over one or more operands.
    Logical(LogicalOp, Vec<Expr>),
    /// Statements evaluated in order; the last one gives the type.
    Seq(Vec<Expr>),
    /// Conditional, with an optional else branch.
    If {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Option<Box<Expr>>,
    },
    /// First branch whose condition holds; fails if none does.
    Cond(Vec<(Expr, Expr)>),
    /// Ends the program with the given integer.
    Return(Box<Expr>),
    /// Fails the program unless the operand is non-zero.
    Assert(Box<Expr>),
    /// Fails the program.
    Err,
    /// Discards a value.
    Pop(Box<Expr>),
    /// Application state access.
    State(StateOp),
    /// Stores a value into a scratch slot.
    Store(ScratchSlot, Box<Expr>),
    /// Loads a scratch slot.
    Load(ScratchSlot, TealType),
    /// Runs a `*_get_ex` opcode and stores both results.
    MaybeStore(Box<MaybeValue>),
}

impl Expr {
    /// Integer constant.
    #[must_use]
    pub const fn int(value: u64) -> Self {
        Self::Int(value)
    }

    /// Byte-string constant.
    #[must_use]
    pub fn bytes(value: impl AsRef<[u8]>) -> Self {
        Self::Bytes(value.as_ref().to_vec())
    }

    /// Address constant.
    #[must_use]
    pub const fn addr(address: Address) -> Self {
        Self::Addr(address)
    }

    /// Statement sequence.
    #[must_use]
    pub fn seq(items: impl IntoIterator<Item = Expr>) -> Self {
        Self::Seq(items.into_iter().collect())
    }

    /// `if cond { then }`.
    #[must_use]
    pub fn if_then(cond: Expr, then: Expr) -> Self {
        Self::If {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: None,
        }
    }

    /// `if cond { then } else { otherwise }`.
    #[must_use]
    pub fn if_then_else(cond: Expr, then: Expr, otherwise: Expr) -> Self {
        Self::If {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Some(Box::new(otherwise)),
        }
    }

    /// Branch table.
    #[must_use]
    pub fn cond(branches: impl IntoIterator<Item = (Expr, Expr)>) -> Self {
        Self::Cond(branches.into_iter().collect())
    }

    /// Ends the program with `value`.
    #[must_use]
    pub fn ret(value: Expr) -> Self {
        Self::Return(Box::new(value))
    }

    /// Ends the program successfully.
    #[must_use]
    pub fn approve() -> Self {
        Self::ret(Self::Int(1))
    }

    /// Ends the program unsuccessfully.
    #[must_use]
    pub fn reject() -> Self {
        Self::ret(Self::Int(0))
    }

    /// Fails unless `cond` holds.
    #[must_use]
    pub fn assert(cond: Expr) -> Self {
        Self::Assert(Box::new(cond))
    }

    /// Discards the value of `value`.
    #[must_use]
    pub fn pop(value: Expr) -> Self {
        Self::Pop(Box::new(value))
    }

    /// Logical and of all operands.
    #[must_use]
    pub fn and(operands: impl IntoIterator<Item = Expr>) -> Self {
        Self::Logical(LogicalOp::And, operands.into_iter().collect())
    }

    /// Logical or of all operands.
    #[must_use]
    pub fn or(operands: impl IntoIterator<Item = Expr>) -> Self {
        Self::Logical(LogicalOp::Or, operands.into_iter().collect())
    }

    fn binary(self, op: BinaryOp, rhs: Expr) -> Self {
        Self::Binary(op, Box::new(self), Box::new(rhs))
    }

    fn unary(self, op: UnaryOp) -> Self {
        Self::Unary(op, Box::new(self))
    }

    /// `self == rhs`.
    #[must_use]
    pub fn equals(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Eq, rhs)
    }

    /// `self != rhs`.
    #[must_use]
    pub fn not_equals(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Neq, rhs)
    }

    /// `self < rhs`.
    #[must_use]
    pub fn lt(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Lt, rhs)
    }

    /// `self > rhs`.
    #[must_use]
    pub fn gt(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Gt, rhs)
    }

    /// `self <= rhs`.
    #[must_use]
    pub fn le(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Le, rhs)
    }

    /// `self >= rhs`.
    #[must_use]
    pub fn ge(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Ge, rhs)
    }

    /// Concatenates two byte strings.
    #[must_use]
    pub fn concat(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Concat, rhs)
    }

    /// Length of a byte string.
    #[must_use]
    pub fn len(self) -> Self {
        self.unary(UnaryOp::Len)
    }

    /// Integer as 8 big-endian bytes.
    #[must_use]
    pub fn itob(self) -> Self {
        self.unary(UnaryOp::Itob)
    }

    /// Big-endian bytes as integer.
    #[must_use]
    pub fn btoi(self) -> Self {
        self.unary(UnaryOp::Btoi)
    }

    /// Static type of this expression, assuming it is well typed.
    #[must_use]
    pub fn type_of(&self) -> TealType {
        match self {
            Self::Int(_) | Self::OnComplete(_) | Self::Logical(..) => TealType::Uint64,
            Self::Bytes(_) | Self::Addr(_) => TealType::Bytes,
            Self::Txn(field) => field.value_type(),
            Self::TxnArray(field, _) => field.value_type(),
            Self::Global(field) => field.value_type(),
            Self::Unary(op, _) => op.result_type(),
            Self::Binary(op, ..) => op.result_type(),
            Self::Seq(items) => items.last().map_or(TealType::None, Expr::type_of),
            Self::If { then, .. } => then.type_of(),
            Self::Cond(branches) => branches
                .first()
                .map_or(TealType::None, |(_, body)| body.type_of()),
            Self::State(op) => op.result_type(),
            Self::Load(_, value_type) => *value_type,
            Self::Return(_)
            | Self::Assert(_)
            | Self::Err
            | Self::Pop(_)
            | Self::Store(..)
            | Self::MaybeStore(_) => TealType::None,
        }
    }
}

impl From<u64> for Expr {
    fn from(value: u64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Self::bytes(value)
    }
}

impl From<&[u8]> for Expr {
    fn from(value: &[u8]) -> Self {
        Self::bytes(value)
    }
}

impl From<Address> for Expr {
    fn from(value: Address) -> Self {
        Self::Addr(value)
    }
}

impl From<OnComplete> for Expr {
    fn from(value: OnComplete) -> Self {
        Self::OnComplete(value)
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl ops::$trait for Expr {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                self.binary($op, rhs)
            }
        }
    };
}

impl_binary_op!(Add, add, BinaryOp::Add);
impl_binary_op!(Sub, sub, BinaryOp::Minus);
impl_binary_op!(Mul, mul, BinaryOp::Mul);
impl_binary_op!(Div, div, BinaryOp::Div);
impl_binary_op!(Rem, rem, BinaryOp::Mod);
impl_binary_op!(BitAnd, bitand, BinaryOp::BitAnd);
impl_binary_op!(BitOr, bitor, BinaryOp::BitOr);

impl ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        self.unary(UnaryOp::Not)
    }
}
