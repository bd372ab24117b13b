use std::path::Path;

use log::info;
use serde::Deserialize;

use crate::core::base_types::{Address, Token};

use super::{Chain, ChainRegistry, RegistryError};

#[derive(Debug, Deserialize)]
struct RegistryFile {
    chains: Vec<ChainEntry>,
}

#[derive(Debug, Deserialize)]
struct ChainEntry {
    id: u64,
    name: String,
    router: Address,
    #[serde(default)]
    tokens: Vec<Token>,
    #[serde(default)]
    rpc: Vec<String>,
}

impl From<ChainEntry> for Chain {
    fn from(entry: ChainEntry) -> Self {
        Chain::new(entry.id, &entry.name, entry.router, entry.tokens).with_rpc_urls(entry.rpc)
    }
}

impl ChainRegistry {
    /// Parses a chain table such as:
    ///
    /// ```toml
    /// [[chains]]
    /// id = 97
    /// name = "BSC Testnet"
    /// router = "0x..."
    /// rpc = ["https://data-seed-prebsc-1-s1.binance.org:8545/"]
    ///
    /// [[chains.tokens]]
    /// address = "0x0000000000000000000000000000000000000000"
    /// symbol = "BNB"
    /// decimals = 18
    /// glyph = "🟡"
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, RegistryError> {
        let file: RegistryFile = toml::from_str(source).map_err(|e| RegistryError::Parse(e.to_string()))?;
        let count = file.chains.len();
        let mut chains = file.chains.into_iter().map(Chain::from);
        match (chains.next(), chains.next(), count) {
            (Some(first), Some(second), 2) => Self::new(first, second),
            _ => Err(RegistryError::WrongChainCount(count)),
        }
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, RegistryError> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| RegistryError::Parse(format!("{}: {}", path.display(), e)))?;
        let registry = Self::from_toml_str(&source)?;
        info!("loaded chain table from {}: {:?}", path.display(), registry.chain_ids());
        Ok(registry)
    }
}
