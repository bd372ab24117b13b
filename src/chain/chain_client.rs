//! JSON-RPC client for one chain.
//!
//! Features:
//! - Multiple RPC endpoint fallback, tried in order
//! - Per-request timeout
//! - Error classification (transport vs node-side)
//! - Redacted endpoint logging

use std::future::Future;
use std::time::Duration;

use alloy::network::TransactionBuilder;
use alloy::primitives::{B256, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use log::{debug, warn};
use url::Url;

use crate::chain::contracts::IERC20;
use crate::chain::errors::{ChainClientCreationError, ChainClientError};
use crate::chain::parsers::parse_tx_hash;
use crate::chain::receipt_polling::poll_for_receipt;
use crate::chain::RpcUrl;
use crate::core::base_types::{Address, TransactionReceipt};
use crate::core::wallet_manager::WalletManager;

pub struct ChainClient {
    chain_id: u64,
    /// Endpoints to try, in order
    rpc_urls: Vec<RpcUrl>,
    /// Upper bound for a single request against one endpoint
    timeout: Duration,
}

impl ChainClient {
    /// Creates a client for `chain_id`.
    ///
    /// # Examples
    /// ```
    /// # use xchain_swap::chain::{ChainClient, RpcUrl, ChainClientCreationError};
    /// let rpc_urls = vec![RpcUrl::public("https://data-seed-prebsc-1-s1.binance.org:8545/").unwrap()];
    /// let client = ChainClient::new(97, rpc_urls, 30)?;
    /// assert_eq!(client.chain_id(), 97);
    /// # Ok::<(), ChainClientCreationError>(())
    /// ```
    pub fn new(chain_id: u64, rpc_urls: Vec<RpcUrl>, timeout_secs: u64) -> Result<Self, ChainClientCreationError> {
        if rpc_urls.is_empty() {
            return Err(ChainClientCreationError::NoRpcUrlsProvided);
        }
        Ok(Self {
            chain_id,
            rpc_urls,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn rpc_urls(&self) -> &[RpcUrl] {
        &self.rpc_urls
    }

    /// Runs `request` against each endpoint until one succeeds.
    async fn with_fallback<T, F, Fut>(&self, operation: &str, request: F) -> Result<T, ChainClientError>
    where
        F: Fn(Url) -> Fut,
        Fut: Future<Output = Result<T, ChainClientError>>,
    {
        let mut last_error = None;

        for rpc_url in &self.rpc_urls {
            let url = match rpc_url.as_url() {
                Ok(url) => url,
                Err(e) => {
                    last_error = Some(ChainClientError::InvalidResponse(e.to_string()));
                    continue;
                }
            };
            let started = tokio::time::Instant::now();
            match tokio::time::timeout(self.timeout, request(url)).await {
                Ok(Ok(value)) => {
                    debug!(
                        "{} on chain {} via {} took {:?}",
                        operation,
                        self.chain_id,
                        rpc_url,
                        started.elapsed()
                    );
                    return Ok(value);
                }
                // the node answered with a JSON-RPC error; another endpoint would say the same
                Ok(Err(e @ ChainClientError::RpcError(_))) => {
                    warn!("{} on chain {} rejected by {}: {}", operation, self.chain_id, rpc_url, e);
                    return Err(e);
                }
                Ok(Err(e)) => {
                    warn!("{} on chain {} via {} failed: {}", operation, self.chain_id, rpc_url, e);
                    last_error = Some(e);
                }
                Err(_) => {
                    warn!("{} on chain {} via {} timed out", operation, self.chain_id, rpc_url);
                    last_error = Some(ChainClientError::TimeoutError(format!(
                        "{} exceeded {:?}",
                        operation, self.timeout
                    )));
                }
            }
        }

        Err(ChainClientError::all_endpoints_failed(last_error))
    }

    /// Chain id reported by the node.
    pub async fn get_chain_id(&self) -> Result<u64, ChainClientError> {
        self.with_fallback("eth_chainId", |url| async move {
            let provider = ProviderBuilder::new().connect_http(url);
            provider.get_chain_id().await.map_err(ChainClientError::from_transport)
        })
        .await
    }

    /// Native-asset balance of `address`, in wei.
    pub async fn get_balance(&self, address: &Address) -> Result<u128, ChainClientError> {
        let account = address.alloy_address();
        let balance = self
            .with_fallback("eth_getBalance", |url| async move {
                let provider = ProviderBuilder::new().connect_http(url);
                provider.get_balance(account).await.map_err(ChainClientError::from_transport)
            })
            .await?;
        u256_to_u128(balance)
    }

    /// ERC20 `balanceOf(owner)` on `token`, in the token's smallest unit.
    ///
    /// Amounts are held as `u128`; a balance above `u128::MAX` comes back as
    /// `InvalidResponse` and fails the refresh it belongs to.
    pub async fn get_token_balance(&self, token: &Address, owner: &Address) -> Result<u128, ChainClientError> {
        let token = token.alloy_address();
        let owner = owner.alloy_address();
        let balance = self
            .with_fallback("balanceOf", |url| async move {
                let provider = ProviderBuilder::new().connect_http(url);
                IERC20::new(token, provider)
                    .balanceOf(owner)
                    .call()
                    .await
                    .map_err(|e| match e {
                        alloy::contract::Error::TransportError(e) => ChainClientError::from_transport(e),
                        other => ChainClientError::InvalidResponse(format!("balanceOf call failed: {}", other)),
                    })
            })
            .await?;
        u256_to_u128(balance)
    }

    /// Signs `tx` with `wallet` and broadcasts it. Does NOT wait for confirmation.
    ///
    /// Nonce, gas and fee fields left empty on `tx` are filled from the node.
    pub async fn send_transaction(
        &self,
        wallet: &WalletManager,
        tx: TransactionRequest,
    ) -> Result<B256, ChainClientError> {
        let tx = tx.with_chain_id(self.chain_id).with_from(wallet.address().alloy_address());
        self.with_fallback("eth_sendRawTransaction", |url| {
            let tx = tx.clone();
            let signer = wallet.ethereum_wallet();
            async move {
                let provider = ProviderBuilder::new().wallet(signer).connect_http(url);
                let pending = provider
                    .send_transaction(tx)
                    .await
                    .map_err(ChainClientError::from_transport)?;
                Ok(*pending.tx_hash())
            }
        })
        .await
    }

    /// Receipt for `hash`, or `None` while the transaction is not yet included.
    pub async fn get_receipt(&self, hash: B256) -> Result<Option<TransactionReceipt>, ChainClientError> {
        self.with_fallback("eth_getTransactionReceipt", |url| async move {
            let provider = ProviderBuilder::new().connect_http(url);
            let receipt = provider
                .get_transaction_receipt(hash)
                .await
                .map_err(ChainClientError::from_transport)?;
            match receipt {
                Some(receipt) => {
                    let receipt_json = serde_json::to_value(receipt).map_err(|e| {
                        ChainClientError::InvalidResponse(format!("Failed to serialize receipt: {}", e))
                    })?;
                    TransactionReceipt::from_web3(receipt_json)
                        .map(Some)
                        .map_err(|e| ChainClientError::InvalidResponse(format!("Failed to parse receipt: {}", e)))
                }
                None => Ok(None),
            }
        })
        .await
    }

    /// Waits until `tx_hash` is included.
    ///
    /// # Arguments
    /// * `tx_hash` - `0x`-prefixed transaction hash
    /// * `timeout` - Maximum time to wait in seconds
    /// * `poll_interval` - Interval between polls in seconds
    pub async fn wait_for_receipt(
        &self,
        tx_hash: &str,
        timeout: u64,
        poll_interval: f64,
    ) -> Result<TransactionReceipt, ChainClientError> {
        let hash = parse_tx_hash(tx_hash)?;
        poll_for_receipt(self, hash, timeout, poll_interval).await
    }
}

/// Narrows a uint256 balance to the `u128` that `TokenAmount` carries.
fn u256_to_u128(value: U256) -> Result<u128, ChainClientError> {
    if value > U256::from(u128::MAX) {
        return Err(ChainClientError::InvalidResponse(format!(
            "Balance {} does not fit in 128 bits",
            value
        )));
    }
    Ok(value.to::<u128>())
}
