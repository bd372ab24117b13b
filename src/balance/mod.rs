//! Account balances for one chain's token set.

pub mod rpc;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use log::{debug, warn};
use serde::Serialize;
use thiserror::Error;

use crate::chain::ChainClientError;
use crate::core::base_types::{Address, Token, TokenAmount};
use crate::registry::Chain;
use crate::wallet::Session;

pub use rpc::RpcBalanceSource;

#[derive(Error, Debug, Clone)]
pub enum BalanceFetchError {
    #[error("No connected account")]
    NotConnected,

    #[error("{symbol} balance on chain {chain_id}: {source}")]
    Query {
        chain_id: u64,
        symbol: String,
        source: ChainClientError,
    },
}

/// Read-only balance queries against a chain.
#[async_trait]
pub trait BalanceSource: Send + Sync {
    /// Native-asset balance in the smallest unit.
    async fn native_balance(&self, chain_id: u64, account: &Address) -> Result<u128, ChainClientError>;

    /// ERC20 `balanceOf(account)` on `token`.
    async fn token_balance(&self, chain_id: u64, token: &Address, account: &Address) -> Result<u128, ChainClientError>;
}

/// Balances of one account on one chain, keyed by token address.
///
/// Always rebuilt as a whole; never patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceSnapshot {
    pub account: Address,
    pub chain_id: u64,
    /// Decimal strings scaled by each token's decimals
    pub balances: BTreeMap<Address, String>,
}

impl BalanceSnapshot {
    pub fn get(&self, token: &Address) -> Option<&str> {
        self.balances.get(token).map(String::as_str)
    }
}

pub struct BalanceService {
    source: Arc<dyn BalanceSource>,
}

impl BalanceService {
    pub fn new(source: Arc<dyn BalanceSource>) -> Self {
        Self { source }
    }

    /// Queries every token of `chain` for the session's account, concurrently.
    ///
    /// Any single failed query fails the whole refresh; no partial snapshot is returned.
    pub async fn refresh(&self, session: &Session, chain: &Chain) -> Result<BalanceSnapshot, BalanceFetchError> {
        let account = session.account.ok_or(BalanceFetchError::NotConnected)?;
        debug!("refreshing {} balances of {} on chain {}", chain.tokens.len(), account, chain.id);

        let queries = chain.tokens.iter().map(|token| self.query(chain.id, token, account));
        let balances = try_join_all(queries).await.map_err(|e| {
            warn!("balance refresh on chain {} failed: {}", chain.id, e);
            e
        })?;

        Ok(BalanceSnapshot {
            account,
            chain_id: chain.id,
            balances: balances
                .into_iter()
                .map(|(address, amount)| (address, amount.human()))
                .collect(),
        })
    }

    async fn query(&self, chain_id: u64, token: &Token, account: Address) -> Result<(Address, TokenAmount), BalanceFetchError> {
        let raw = if token.is_native() {
            self.source.native_balance(chain_id, &account).await
        } else {
            self.source.token_balance(chain_id, &token.address, &account).await
        }
        .map_err(|source| BalanceFetchError::Query {
            chain_id,
            symbol: token.symbol.clone(),
            source,
        })?;
        Ok((token.address, TokenAmount::for_token(raw, token)))
    }
}
