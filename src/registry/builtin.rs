use crate::core::base_types::{Address, Token};

use super::{Chain, ChainRegistry, RegistryError};

pub const BSC_TESTNET_CHAIN_ID: u64 = 97;
pub const BNW_CHAIN_ID: u64 = 714;

pub const DEFAULT_BSC_TESTNET_RPC: &str = "https://data-seed-prebsc-1-s1.binance.org:8545/";
pub const DEFAULT_BNW_RPC: &str = "http://174.138.18.77:8545";

const WBNB_BSC_TESTNET: &str = "0xae13d989daC2f0dEbFf460aC112a837C89BAa7cd";

pub fn bsc_testnet(router: Address) -> Result<Chain, RegistryError> {
    let wbnb = Address::from_string(WBNB_BSC_TESTNET).map_err(|e| RegistryError::Parse(e.to_string()))?;
    Ok(Chain::new(
        BSC_TESTNET_CHAIN_ID,
        "BSC Testnet",
        router,
        vec![Token::native("BNB", 18, "🟡"), Token::new(wbnb, "WBNB", 18, "🟨")],
    )
    .with_rpc_urls(vec![DEFAULT_BSC_TESTNET_RPC.to_string()]))
}

pub fn bnw_chain(router: Address) -> Chain {
    Chain::new(BNW_CHAIN_ID, "BNW Chain", router, vec![Token::native("BNW", 18, "🟢")])
        .with_rpc_urls(vec![DEFAULT_BNW_RPC.to_string()])
}

impl ChainRegistry {
    /// The BSC Testnet ↔ BNW Chain pair. Router addresses are deployment-specific.
    pub fn builtin(bsc_router: Address, bnw_router: Address) -> Result<Self, RegistryError> {
        Self::new(bsc_testnet(bsc_router)?, bnw_chain(bnw_router))
    }
}
