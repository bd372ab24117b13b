use serde::{Deserialize, Serialize};

use super::address::Address;

/// A tradable asset on one chain. The zero address marks the chain's native asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
    #[serde(default)]
    pub glyph: String,
}

impl Token {
    pub fn new(address: Address, symbol: &str, decimals: u8, glyph: &str) -> Self {
        Self {
            address,
            symbol: symbol.to_string(),
            decimals,
            glyph: glyph.to_string(),
        }
    }

    pub fn native(symbol: &str, decimals: u8, glyph: &str) -> Self {
        Self::new(Address::ZERO, symbol, decimals, glyph)
    }

    pub fn is_native(&self) -> bool {
        self.address.is_zero()
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}
