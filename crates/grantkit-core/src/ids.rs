//! Strong identifier types for grantkit.
//!
//! Grant and redemption ids are generated locally as 16 random bytes and
//! rendered as hex. Principal ids are opaque strings owned by the
//! surrounding product; we never inspect them.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 16-byte grant identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GrantId(pub [u8; 16]);

/// A 16-byte redemption identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RedemptionId(pub [u8; 16]);

macro_rules! impl_id {
    ($name:ident) => {
        impl $name {
            /// Generate a fresh random identifier.
            pub fn generate() -> Self {
                let mut bytes = [0u8; 16];
                rand::thread_rng().fill_bytes(&mut bytes);
                Self(bytes)
            }

            /// Create from raw bytes.
            pub const fn from_bytes(bytes: [u8; 16]) -> Self {
                Self(bytes)
            }

            /// Get the raw bytes.
            pub const fn as_bytes(&self) -> &[u8; 16] {
                &self.0
            }

            /// Convert to hex string.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            /// Parse from hex string.
            pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
                let bytes = hex::decode(s)?;
                if bytes.len() != 16 {
                    return Err(hex::FromHexError::InvalidStringLength);
                }
                let mut arr = [0u8; 16];
                arr.copy_from_slice(&bytes);
                Ok(Self(arr))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.to_hex())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = std::array::TryFromSliceError;

            fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
                let arr: [u8; 16] = slice.try_into()?;
                Ok(Self(arr))
            }
        }
    };
}

impl_id!(GrantId);
impl_id!(RedemptionId);

/// An opaque principal identifier from the surrounding product.
///
/// Identifies grant owners, supported subjects, and redeemers alike.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrincipalId(String);

impl PrincipalId {
    /// Wrap an external principal identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PrincipalId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PrincipalId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_id_hex_roundtrip() {
        let id = GrantId::from_bytes([0x42; 16]);
        let hex = id.to_hex();
        let recovered = GrantId::from_hex(&hex).unwrap();
        assert_eq!(id, recovered);
    }

    #[test]
    fn grant_id_rejects_short_hex() {
        assert!(GrantId::from_hex("abcd").is_err());
    }

    #[test]
    fn generated_ids_are_distinct() {
        let a = RedemptionId::generate();
        let b = RedemptionId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn principal_id_display() {
        let p = PrincipalId::new("user-123");
        assert_eq!(p.to_string(), "user-123");
        assert_eq!(p.as_str(), "user-123");
    }
}
