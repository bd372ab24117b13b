use std::fmt;
use std::str::FromStr;

use alloy::primitives::Address as AlloyAddress;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A 20-byte EVM account or contract address.
///
/// Parsing is strict (`0x` + 40 hex characters). Equality ignores the casing of
/// the original string; display always uses the EIP-55 checksum form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(AlloyAddress);

impl Address {
    /// The zero address. Token entries use it as the native-asset sentinel.
    pub const ZERO: Address = Address(AlloyAddress::ZERO);

    pub fn zero() -> Self {
        Self::ZERO
    }

    pub fn from_string(s: &str) -> Result<Self, AddressError> {
        let hex_part = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| AddressError::MissingPrefix(s.to_string()))?;
        if s.len() != 42 {
            return Err(AddressError::InvalidLength(s.len(), s.to_string()));
        }
        if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AddressError::InvalidHexCharacters(s.to_string()));
        }
        let bytes = hex::decode(hex_part).map_err(|e| AddressError::HexDecodeError(e.to_string()))?;
        let raw: [u8; 20] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| AddressError::InvalidByteLength(v.len()))?;
        Ok(Address(AlloyAddress::from(raw)))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == AlloyAddress::ZERO
    }

    pub fn checksum(&self) -> String {
        self.0.to_checksum(None)
    }

    pub fn lower(&self) -> String {
        format!("{:#x}", self.0)
    }

    pub fn alloy_address(&self) -> AlloyAddress {
        self.0
    }
}

impl From<AlloyAddress> for Address {
    fn from(value: AlloyAddress) -> Self {
        Address(value)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_string(&value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.checksum()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(\"{}\")", self.checksum())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Address must start with '0x', got: {0}")]
    MissingPrefix(String),

    #[error("Address must be 42 characters (0x + 40 hex chars), got {0} characters: {1}")]
    InvalidLength(usize, String),

    #[error("Address contains invalid hex characters: {0}")]
    InvalidHexCharacters(String),

    #[error("Failed to decode address hex: {0}")]
    HexDecodeError(String),

    #[error("Address must decode to exactly 20 bytes, got {0} bytes")]
    InvalidByteLength(usize),
}
