use alloy::primitives::B256;

use crate::chain::errors::ChainClientError;

pub fn parse_tx_hash(tx_hash: &str) -> Result<B256, ChainClientError> {
    let hex_part = tx_hash.strip_prefix("0x").ok_or_else(|| {
        ChainClientError::InvalidResponse(format!("Transaction hash must start with '0x': {}", tx_hash))
    })?;
    if hex_part.len() != 64 {
        return Err(ChainClientError::InvalidResponse(format!(
            "Transaction hash must be 64 hex characters (32 bytes): got {} characters",
            hex_part.len()
        )));
    }
    let bytes = hex::decode(hex_part)
        .map_err(|e| ChainClientError::InvalidResponse(format!("Invalid transaction hash hex '{}': {}", tx_hash, e)))?;
    Ok(B256::from_slice(&bytes))
}

/// Parses the `0x`-prefixed hex chain id wallets push in `chainChanged`.
/// Plain decimal strings are accepted too.
pub fn parse_hex_chain_id(value: &str) -> Result<u64, ChainClientError> {
    let value = value.trim();
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex_str) => u64::from_str_radix(hex_str, 16),
        None => value.parse::<u64>(),
    };
    parsed.map_err(|_| ChainClientError::InvalidResponse(format!("Invalid chain id: {}", value)))
}

/// Hex form used by `wallet_switchEthereumChain`, e.g. `97` → `"0x61"`.
pub fn to_hex_chain_id(chain_id: u64) -> String {
    format!("{:#x}", chain_id)
}
