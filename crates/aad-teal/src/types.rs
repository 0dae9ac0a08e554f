//! # Static Types

use std::fmt;

/// Static type of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TealType {
    /// 64-bit unsigned integer.
    Uint64,
    /// Byte string.
    Bytes,
    /// Either, decided at run time (e.g. an untyped state read).
    Any,
    /// Leaves nothing on the stack.
    None,
}

impl TealType {
    /// Returns true if a value of type `actual` may appear where `self` is
    /// required. `Any` is compatible with every value type but not `None`.
    #[must_use]
    pub fn accepts(self, actual: TealType) -> bool {
        match (self, actual) {
            (a, b) if a == b => true,
            (Self::Any, Self::Uint64 | Self::Bytes) | (Self::Uint64 | Self::Bytes, Self::Any) => {
                true
            }
            _ => false,
        }
    }

    /// Returns true for the two concrete value types.
    #[must_use]
    pub const fn is_value(self) -> bool {
        matches!(self, Self::Uint64 | Self::Bytes)
    }
}

impl fmt::Display for TealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uint64 => "uint64",
            Self::Bytes => "bytes",
            Self::Any => "any",
            Self::None => "none",
        };
        f.write_str(name)
    }
}
