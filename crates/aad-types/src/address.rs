//! # Addresses
//!
//! A 32-byte account public key, rendered as the platform's 58 character
//! base32 text: `base32(pk || checksum)` without padding, where the checksum
//! is the last four bytes of `sha512_256(pk)`.

use data_encoding::BASE32_NOPAD;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use sha2::{Digest, Sha512_256};
use std::fmt;
use std::str::FromStr;

use crate::errors::TypesError;

/// Domain separator hashed ahead of an application id to derive its address.
pub const APP_ID_PREFIX: &[u8] = b"appID";

/// Number of checksum bytes appended to the public key in the text form.
pub const CHECKSUM_LENGTH: usize = 4;

/// A 32-byte account address.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, SerializeDisplay, DeserializeFromStr,
)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Length of the raw public key.
    pub const LENGTH: usize = 32;

    /// Creates an address from a 32-byte public key.
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Creates an address from a slice. Returns None if wrong length.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let bytes: [u8; 32] = slice.try_into().ok()?;
        Some(Self(bytes))
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns true if this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// The escrow address controlled by application `app_id`.
    ///
    /// `sha512_256("appID" || app_id as 8 big-endian bytes)`.
    #[must_use]
    pub fn for_application(app_id: u64) -> Self {
        let mut hasher = Sha512_256::new();
        hasher.update(APP_ID_PREFIX);
        hasher.update(app_id.to_be_bytes());
        Self(hasher.finalize().into())
    }

    fn checksum(&self) -> [u8; CHECKSUM_LENGTH] {
        let digest = Sha512_256::digest(self.0);
        let mut checksum = [0u8; CHECKSUM_LENGTH];
        checksum.copy_from_slice(&digest[digest.len() - CHECKSUM_LENGTH..]);
        checksum
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut raw = Vec::with_capacity(Self::LENGTH + CHECKSUM_LENGTH);
        raw.extend_from_slice(&self.0);
        raw.extend_from_slice(&self.checksum());
        f.write_str(&BASE32_NOPAD.encode(&raw))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = BASE32_NOPAD
            .decode(s.as_bytes())
            .map_err(|e| TypesError::InvalidAddress(format!("{s}: {e}")))?;

        if raw.len() != Self::LENGTH + CHECKSUM_LENGTH {
            return Err(TypesError::InvalidAddress(format!(
                "{s}: decoded to {} bytes",
                raw.len()
            )));
        }

        let (key, checksum) = raw.split_at(Self::LENGTH);
        let address = Self::from_slice(key)
            .ok_or_else(|| TypesError::InvalidAddress(s.to_string()))?;
        if address.checksum() != checksum {
            return Err(TypesError::InvalidAddress(format!("{s}: bad checksum")));
        }

        Ok(address)
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<Address> for [u8; 32] {
    fn from(addr: Address) -> Self {
        addr.0
    }
}
