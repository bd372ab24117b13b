//! Wallet provider backed by a local key and the chains' JSON-RPC endpoints.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::chain::parsers::{parse_hex_chain_id, to_hex_chain_id};
use crate::chain::ChainClient;
use crate::core::wallet_manager::WalletManager;

use super::provider::{Connection, ProviderError, ProviderEvent, WalletProvider};

pub struct LocalWalletProvider {
    wallet: Arc<WalletManager>,
    clients: HashMap<u64, Arc<ChainClient>>,
    initial_chain_id: u64,
    /// `None` until the first successful connect
    active_chain_id: Mutex<Option<u64>>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<ProviderEvent>>>,
}

impl LocalWalletProvider {
    pub fn new(wallet: Arc<WalletManager>, clients: Vec<Arc<ChainClient>>, initial_chain_id: u64) -> Self {
        Self {
            wallet,
            clients: clients.into_iter().map(|c| (c.chain_id(), c)).collect(),
            initial_chain_id,
            active_chain_id: Mutex::new(None),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn active_chain_id(&self) -> Option<u64> {
        *self.active_chain_id.lock()
    }

    /// Drops the connection and tells every listener.
    pub fn disconnect(&self) {
        *self.active_chain_id.lock() = None;
        self.emit(ProviderEvent::Disconnect);
    }

    fn emit(&self, event: ProviderEvent) {
        debug!("wallet event: {:?}", event);
        self.subscribers
            .lock()
            .retain(|sender| sender.send(event.clone()).is_ok());
    }
}

#[async_trait]
impl WalletProvider for LocalWalletProvider {
    async fn connect(&self) -> Result<Connection, ProviderError> {
        let wanted = self.active_chain_id().unwrap_or(self.initial_chain_id);
        let client = self
            .clients
            .get(&wanted)
            .ok_or_else(|| ProviderError::UnrecognizedChain(to_hex_chain_id(wanted)))?;

        let chain_id = client
            .get_chain_id()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        if chain_id != wanted {
            return Err(ProviderError::InvalidResponse(format!(
                "endpoint for chain {} reports chain {}",
                wanted, chain_id
            )));
        }

        *self.active_chain_id.lock() = Some(chain_id);
        let account = self.wallet.address();
        info!("local wallet connected: {} on chain {}", account, chain_id);
        Ok(Connection { account, chain_id })
    }

    async fn switch_chain(&self, chain_id_hex: &str) -> Result<(), ProviderError> {
        let target = parse_hex_chain_id(chain_id_hex).map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        if self.active_chain_id().is_none() {
            return Err(ProviderError::NotConnected);
        }
        if !self.clients.contains_key(&target) {
            return Err(ProviderError::UnrecognizedChain(chain_id_hex.to_string()));
        }

        *self.active_chain_id.lock() = Some(target);
        self.emit(ProviderEvent::ChainChanged(to_hex_chain_id(target)));
        Ok(())
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<ProviderEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribers.lock().push(sender);
        receiver
    }
}
