use std::str::FromStr;

use sha2::{Digest, Sha256};
use thiserror::Error;

pub const ADDRESS_BYTES: usize = 20;

/// Version byte prefixed to the payload before base58check encoding.
pub const ADDRESS_VERSION: u8 = 0x17;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid base58 address {0:?}: {1}")]
    Base58(String, String),
    #[error("address payload must be {ADDRESS_BYTES} bytes, got {0}")]
    Length(usize),
}

/// Account or contract address. Displays as base58check, the same form
/// accepted by the `address:` param type.
#[derive(Default, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Address(pub [u8; ADDRESS_BYTES]);

impl std::ops::Deref for Address {
    type Target = [u8; ADDRESS_BYTES];

    fn deref(&self) -> &Self::Target { &self.0 }
}

impl Address {
    /// Derives the address a contract is deployed at from its code bytes.
    #[must_use]
    pub fn from_code(code: &[u8]) -> Self {
        let digest = Sha256::digest(Sha256::digest(code));
        let mut inner = [0; ADDRESS_BYTES];
        inner.copy_from_slice(&digest[..ADDRESS_BYTES]);
        Self(inner)
    }

    /// # Errors
    ///
    /// Errors if `bytes` is not exactly [`ADDRESS_BYTES`] long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        let inner: [u8; ADDRESS_BYTES] = bytes
            .try_into()
            .map_err(|_| AddressError::Length(bytes.len()))?;
        Ok(Self(inner))
    }

    #[must_use]
    pub fn to_hex(&self) -> String { hex::encode(self.0) }

    #[must_use]
    pub fn to_base58(&self) -> String {
        let mut versioned = Vec::with_capacity(ADDRESS_BYTES + 1);
        versioned.push(ADDRESS_VERSION);
        versioned.extend_from_slice(&self.0);
        bs58::encode(versioned).with_check().into_string()
    }

    /// # Errors
    ///
    /// Errors on a bad alphabet, checksum or version byte, or a payload of
    /// the wrong length.
    pub fn from_base58(s: &str) -> Result<Self, AddressError> {
        let decoded = bs58::decode(s)
            .with_check(Some(ADDRESS_VERSION))
            .into_vec()
            .map_err(|e| AddressError::Base58(s.to_string(), e.to_string()))?;
        // The version byte is kept in front of the payload.
        Self::from_slice(decoded.get(1..).unwrap_or_default())
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Address({})", self.to_base58())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::from_base58(s.trim()) }
}

impl serde::Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> serde::Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
