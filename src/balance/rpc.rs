use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::chain::{ChainClient, ChainClientError};
use crate::core::base_types::Address;

use super::BalanceSource;

/// Balance queries over each chain's JSON-RPC endpoints.
pub struct RpcBalanceSource {
    clients: HashMap<u64, Arc<ChainClient>>,
}

impl RpcBalanceSource {
    pub fn new(clients: Vec<Arc<ChainClient>>) -> Self {
        Self {
            clients: clients.into_iter().map(|c| (c.chain_id(), c)).collect(),
        }
    }

    fn client(&self, chain_id: u64) -> Result<&ChainClient, ChainClientError> {
        self.clients
            .get(&chain_id)
            .map(Arc::as_ref)
            .ok_or_else(|| ChainClientError::all_endpoints_failed(Some(format!("no RPC endpoints for chain {}", chain_id))))
    }
}

#[async_trait]
impl BalanceSource for RpcBalanceSource {
    async fn native_balance(&self, chain_id: u64, account: &Address) -> Result<u128, ChainClientError> {
        self.client(chain_id)?.get_balance(account).await
    }

    async fn token_balance(&self, chain_id: u64, token: &Address, account: &Address) -> Result<u128, ChainClientError> {
        self.client(chain_id)?.get_token_balance(token, account).await
    }
}
