//! Submission of `swapCrossChain` calls to a chain's router.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::{info, warn};
use thiserror::Error;

use crate::chain::{ChainClient, ChainClientError};
use crate::core::base_types::TransactionReceipt;
use crate::core::wallet_manager::WalletManager;
use crate::registry::Chain;

use super::request::SwapRequest;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Transaction rejected: {0}")]
    Rejected(String),

    #[error("Transaction {0} reverted")]
    Reverted(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timed out: {0}")]
    Timeout(String),
}

impl From<ChainClientError> for GatewayError {
    fn from(err: ChainClientError) -> Self {
        match err {
            ChainClientError::RpcError(msg) => GatewayError::Rejected(msg),
            ChainClientError::TimeoutError(msg) => GatewayError::Timeout(msg),
            other => GatewayError::Network(other.to_string()),
        }
    }
}

/// Inclusion record of a confirmed swap on the source chain.
pub type SwapReceipt = TransactionReceipt;

/// A swap the router accepted but which may not be mined yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSwap {
    pub chain_id: u64,
    pub tx_hash: String,
}

#[async_trait]
pub trait RouterGateway: Send + Sync {
    /// Signs and broadcasts `request` against `chain`'s router.
    async fn submit_swap(&self, chain: &Chain, request: &SwapRequest) -> Result<PendingSwap, GatewayError>;

    /// Resolves once the transaction is mined successfully.
    async fn await_confirmation(&self, pending: &PendingSwap) -> Result<SwapReceipt, GatewayError>;
}

/// Router access through the local key and the chains' JSON-RPC endpoints.
pub struct RpcGateway {
    wallet: Arc<WalletManager>,
    clients: HashMap<u64, Arc<ChainClient>>,
    /// Seconds
    confirmation_timeout: u64,
    /// Seconds
    poll_interval: f64,
}

impl RpcGateway {
    pub fn new(
        wallet: Arc<WalletManager>,
        clients: Vec<Arc<ChainClient>>,
        confirmation_timeout: u64,
        poll_interval: f64,
    ) -> Self {
        Self {
            wallet,
            clients: clients.into_iter().map(|c| (c.chain_id(), c)).collect(),
            confirmation_timeout,
            poll_interval,
        }
    }

    fn client(&self, chain_id: u64) -> Result<&ChainClient, GatewayError> {
        self.clients
            .get(&chain_id)
            .map(Arc::as_ref)
            .ok_or_else(|| GatewayError::Network(format!("no RPC endpoints for chain {}", chain_id)))
    }
}

#[async_trait]
impl RouterGateway for RpcGateway {
    async fn submit_swap(&self, chain: &Chain, request: &SwapRequest) -> Result<PendingSwap, GatewayError> {
        if chain.router.is_zero() {
            return Err(GatewayError::Rejected(format!("no router configured for chain {}", chain.id)));
        }
        let client = self.client(chain.id)?;
        let tx = request.to_transaction(&chain.router);
        let hash = client.send_transaction(&self.wallet, tx).await.map_err(|e| {
            warn!("swap submission on chain {} failed: {}", chain.id, e);
            GatewayError::from(e)
        })?;
        let tx_hash = format!("{:#x}", hash);
        info!("swap submitted on chain {} via router {}: {}", chain.id, chain.router, tx_hash);
        Ok(PendingSwap {
            chain_id: chain.id,
            tx_hash,
        })
    }

    async fn await_confirmation(&self, pending: &PendingSwap) -> Result<SwapReceipt, GatewayError> {
        let receipt = self
            .client(pending.chain_id)?
            .wait_for_receipt(&pending.tx_hash, self.confirmation_timeout, self.poll_interval)
            .await?;
        if !receipt.status {
            return Err(GatewayError::Reverted(receipt.tx_hash));
        }
        info!("swap {} confirmed in block {}", receipt.tx_hash, receipt.block_number);
        Ok(receipt)
    }
}
