//! # Scratch Space
//!
//! Symbolic scratch slots and the `MaybeValue` pair written by the
//! `*_get_ex` opcodes. Slots are identified by a process-wide id; the
//! compiler maps ids to indices `0..=255` in order of first use.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::expr::{Expr, StateOp};
use crate::types::TealType;

static NEXT_SLOT_ID: AtomicU64 = AtomicU64::new(0);

/// A symbolic scratch slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScratchSlot(u64);

impl ScratchSlot {
    /// Allocates a fresh slot.
    #[must_use]
    pub fn new() -> Self {
        Self(NEXT_SLOT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Process-wide id of this slot.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Stores the result of `value` into this slot.
    #[must_use]
    pub fn store(self, value: Expr) -> Expr {
        Expr::Store(self, Box::new(value))
    }

    /// Loads this slot, assuming it holds a `value_type`.
    #[must_use]
    pub fn load(self, value_type: TealType) -> Expr {
        Expr::Load(self, value_type)
    }
}

impl Default for ScratchSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// The outcome of a `*_get_ex` opcode: a value plus an existence flag, kept
/// in two scratch slots.
///
/// `store()` must run before `value()` or `has_value()` are read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaybeValue {
    op: StateOp,
    value_type: TealType,
    value_slot: ScratchSlot,
    has_value_slot: ScratchSlot,
}

impl MaybeValue {
    /// Wraps `op`, which must be `GlobalGetEx` or `LocalGetEx`.
    #[must_use]
    pub fn new(op: StateOp, value_type: TealType) -> Self {
        Self {
            op,
            value_type,
            value_slot: ScratchSlot::new(),
            has_value_slot: ScratchSlot::new(),
        }
    }

    /// The wrapped opcode.
    #[must_use]
    pub fn op(&self) -> &StateOp {
        &self.op
    }

    /// Type of the stored value.
    #[must_use]
    pub const fn value_type(&self) -> TealType {
        self.value_type
    }

    /// Slot receiving the value.
    #[must_use]
    pub const fn value_slot(&self) -> ScratchSlot {
        self.value_slot
    }

    /// Slot receiving the existence flag.
    #[must_use]
    pub const fn has_value_slot(&self) -> ScratchSlot {
        self.has_value_slot
    }

    /// Runs the opcode and stores both results.
    #[must_use]
    pub fn store(&self) -> Expr {
        Expr::MaybeStore(Box::new(self.clone()))
    }

    /// Reads the stored value.
    #[must_use]
    pub fn value(&self) -> Expr {
        self.value_slot.load(self.value_type)
    }

    /// Reads the stored existence flag.
    #[must_use]
    pub fn has_value(&self) -> Expr {
        self.has_value_slot.load(TealType::Uint64)
    }

    /// Runs the opcode, then reads the value.
    #[must_use]
    pub fn load_value(&self) -> Expr {
        Expr::seq([self.store(), self.value()])
    }

    /// Runs the opcode, then reads the existence flag.
    #[must_use]
    pub fn load_has_value(&self) -> Expr {
        Expr::seq([self.store(), self.has_value()])
    }
}
