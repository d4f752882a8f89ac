//! # Addresses
//!
//! Every participant in the engine — user accounts, the custodian, each
//! sale, each collection — is identified by an [`Address`]. The canonical
//! form is a `0x`-prefixed, 40-character hex string (20 bytes), but the
//! type accepts any opaque identity string so tests and tooling can use
//! readable names.
//!
//! The zero address is reserved: it is never a valid participant and is
//! used as the "absent" sentinel by lookups.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::{ADDRESS_LENGTH, ADDRESS_PREFIX};

/// An opaque identity.
///
/// Comparison is exact string equality; the engine never interprets the
/// contents beyond the zero-address check.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wraps an identity string.
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    /// The reserved zero address: `0x` followed by 40 zeros.
    pub fn zero() -> Self {
        Self(format!("{}{}", ADDRESS_PREFIX, "0".repeat(ADDRESS_LENGTH * 2)))
    }

    /// Returns `true` for the zero address and for the empty string.
    pub fn is_zero(&self) -> bool {
        self.0.is_empty() || *self == Self::zero()
    }

    /// Derives a fresh address from a tag and a nonce.
    ///
    /// The engine uses this for every entity it instantiates: the tag names
    /// the entity kind, the nonce is a per-engine counter, so derivation is
    /// deterministic and collision-free within one engine.
    pub fn derive(tag: &str, nonce: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(tag.as_bytes());
        hasher.update(nonce.to_be_bytes());
        let digest = hasher.finalize();
        Self(format!(
            "{}{}",
            ADDRESS_PREFIX,
            hex::encode(&digest[..ADDRESS_LENGTH])
        ))
    }

    /// The underlying identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
