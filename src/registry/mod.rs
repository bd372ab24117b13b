//! The two chains the client swaps between.
//!
//! Loaded once at start and shared as `Arc<ChainRegistry>`; nothing mutates it afterwards.

pub mod builtin;
pub mod loader;

use thiserror::Error;

use crate::core::base_types::{Address, Token};

/// Largest decimals value a `u128` fixed-point amount can scale to.
pub const MAX_TOKEN_DECIMALS: u8 = 38;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unsupported chain id: {0}")]
    UnsupportedChain(u64),

    #[error("Both configured chains use id {0}")]
    DuplicateChainId(u64),

    #[error("Exactly two chains must be configured, found {0}")]
    WrongChainCount(usize),

    #[error("Chain {0} has no native token (zero address entry)")]
    MissingNativeToken(u64),

    #[error("Token {symbol} on chain {chain_id} declares {decimals} decimals (max {MAX_TOKEN_DECIMALS})")]
    InvalidDecimals { chain_id: u64, symbol: String, decimals: u8 },

    #[error("Token address {address} listed twice on chain {chain_id}")]
    DuplicateToken { chain_id: u64, address: Address },

    #[error("Token symbol {symbol} listed twice on chain {chain_id}")]
    DuplicateSymbol { chain_id: u64, symbol: String },

    #[error("Failed to parse chain table: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub id: u64,
    pub name: String,
    pub router: Address,
    /// In declaration order
    pub tokens: Vec<Token>,
    /// Public JSON-RPC endpoints, tried in order; env settings may override them
    pub rpc_urls: Vec<String>,
}

impl Chain {
    pub fn new(id: u64, name: &str, router: Address, tokens: Vec<Token>) -> Self {
        Self {
            id,
            name: name.to_string(),
            router,
            tokens,
            rpc_urls: Vec::new(),
        }
    }

    pub fn with_rpc_urls(mut self, rpc_urls: Vec<String>) -> Self {
        self.rpc_urls = rpc_urls;
        self
    }

    pub fn native_token(&self) -> Option<&Token> {
        self.tokens.iter().find(|t| t.is_native())
    }

    pub fn token(&self, symbol: &str) -> Option<&Token> {
        self.tokens.iter().find(|t| t.symbol == symbol)
    }

    pub fn token_by_address(&self, address: &Address) -> Option<&Token> {
        self.tokens.iter().find(|t| t.address == *address)
    }

    pub fn contains_token(&self, address: &Address) -> bool {
        self.token_by_address(address).is_some()
    }

    fn check(&self) -> Result<(), RegistryError> {
        if self.native_token().is_none() {
            return Err(RegistryError::MissingNativeToken(self.id));
        }
        for (i, token) in self.tokens.iter().enumerate() {
            if token.decimals > MAX_TOKEN_DECIMALS {
                return Err(RegistryError::InvalidDecimals {
                    chain_id: self.id,
                    symbol: token.symbol.clone(),
                    decimals: token.decimals,
                });
            }
            let earlier = &self.tokens[..i];
            if earlier.iter().any(|t| t.address == token.address) {
                return Err(RegistryError::DuplicateToken {
                    chain_id: self.id,
                    address: token.address,
                });
            }
            if earlier.iter().any(|t| t.symbol == token.symbol) {
                return Err(RegistryError::DuplicateSymbol {
                    chain_id: self.id,
                    symbol: token.symbol.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Exactly two chains; each one's swap destination is the other.
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    chains: [Chain; 2],
}

impl ChainRegistry {
    pub fn new(first: Chain, second: Chain) -> Result<Self, RegistryError> {
        if first.id == second.id {
            return Err(RegistryError::DuplicateChainId(first.id));
        }
        first.check()?;
        second.check()?;
        Ok(Self { chains: [first, second] })
    }

    pub fn resolve(&self, chain_id: u64) -> Result<&Chain, RegistryError> {
        self.chains
            .iter()
            .find(|c| c.id == chain_id)
            .ok_or(RegistryError::UnsupportedChain(chain_id))
    }

    /// The swap destination for `chain_id`.
    pub fn pair_of(&self, chain_id: u64) -> Result<&Chain, RegistryError> {
        match self.position(chain_id) {
            Some(0) => Ok(&self.chains[1]),
            Some(_) => Ok(&self.chains[0]),
            None => Err(RegistryError::UnsupportedChain(chain_id)),
        }
    }

    pub fn is_supported(&self, chain_id: u64) -> bool {
        self.position(chain_id).is_some()
    }

    pub fn chain_ids(&self) -> [u64; 2] {
        [self.chains[0].id, self.chains[1].id]
    }

    pub fn chains(&self) -> &[Chain; 2] {
        &self.chains
    }

    fn position(&self, chain_id: u64) -> Option<usize> {
        self.chains.iter().position(|c| c.id == chain_id)
    }
}
