//! Secure wrapper around the local signing key.
//!
//! The private key never leaves this type; callers get the account address and
//! a signer handle for transaction submission.

use std::env::{self, VarError};
use std::fmt;

use alloy::network::EthereumWallet;
use alloy::signers::local::PrivateKeySigner;
use k256::ecdsa::SigningKey;
use thiserror::Error;

use super::address::Address;

pub struct WalletManager {
    private_key: SigningKey,
}

impl fmt::Debug for WalletManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletManager")
            .field("address", &self.address())
            .field("private_key", &"****")
            .finish()
    }
}

#[derive(Error, Debug)]
pub enum KeyLoadError {
    #[error("Couldn't load a variable: {0}")]
    LoadVar(#[from] VarError),

    #[error("Invalid key length: expected 32 bytes, got {0} bytes")]
    VecConversion(usize),

    #[error("Invalid key format: expected '0x' prefix")]
    MissingHexPrefix,

    #[error("Invalid hex string: {0}")]
    HexDecode(String),

    #[error("Invalid private key: key is not valid for secp256k1 curve")]
    InvalidPrivateKey,
}

impl WalletManager {
    /// Loads a private key from an environment variable.
    ///
    /// The value must be `0x` followed by exactly 64 hex characters.
    pub fn from_env(var_name: &str) -> Result<WalletManager, KeyLoadError> {
        let key_hex = env::var(var_name)?;
        Self::from_hex_string(key_hex.trim())
    }

    /// Parses a private key from a `0x`-prefixed hex string.
    ///
    /// # Examples
    /// ```
    /// # use xchain_swap::core::wallet_manager::WalletManager;
    /// let wallet = WalletManager::from_hex_string(
    ///     "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef"
    /// ).unwrap();
    /// let _account = wallet.address();
    /// ```
    pub fn from_hex_string(key_hex: &str) -> Result<WalletManager, KeyLoadError> {
        let hex_str = key_hex.strip_prefix("0x").ok_or(KeyLoadError::MissingHexPrefix)?;
        let key_vec = hex::decode(hex_str).map_err(|e| KeyLoadError::HexDecode(e.to_string()))?;
        let key: [u8; 32] = key_vec
            .try_into()
            .map_err(|v: Vec<u8>| KeyLoadError::VecConversion(v.len()))?;

        // from_bytes rejects zero and keys at or above the curve order
        let private_key = SigningKey::from_bytes((&key).into()).map_err(|_| KeyLoadError::InvalidPrivateKey)?;

        Ok(WalletManager { private_key })
    }

    pub fn address(&self) -> Address {
        Address::from(self.signer().address())
    }

    pub fn signer(&self) -> PrivateKeySigner {
        PrivateKeySigner::from_signing_key(self.private_key.clone())
    }

    /// Wallet handle for alloy's signing filler.
    pub fn ethereum_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer())
    }
}
