use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::core::base_types::Address;

/// Pushed by the wallet, in the raw shape wallets emit them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// First entry is the active account; empty means access was revoked.
    AccountsChanged(Vec<String>),
    /// Hex-encoded chain id, e.g. `"0x61"`.
    ChainChanged(String),
    Disconnect,
}

/// Result of a successful connect flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub account: Address,
    pub chain_id: u64,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("User rejected the request")]
    UserRejected,

    #[error("Unrecognized chain {0}; the wallet has no network registered for it")]
    UnrecognizedChain(String),

    #[error("Wallet is not connected")]
    NotConnected,

    #[error("Wallet returned invalid data: {0}")]
    InvalidResponse(String),

    #[error("Wallet transport failed: {0}")]
    Transport(String),
}

/// The external wallet the session talks to.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Runs the wallet's connection flow.
    async fn connect(&self) -> Result<Connection, ProviderError>;

    /// Asks the wallet to move to `chain_id_hex`. Success only means the request was
    /// accepted; the change itself arrives later as `ProviderEvent::ChainChanged`.
    async fn switch_chain(&self, chain_id_hex: &str) -> Result<(), ProviderError>;

    /// Registers a new listener. Events are delivered in the order the wallet emits them.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<ProviderEvent>;
}
