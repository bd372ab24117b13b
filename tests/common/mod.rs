#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use xchain_swap::balance::{BalanceService, BalanceSource};
use xchain_swap::chain::ChainClientError;
use xchain_swap::core::base_types::{Address, TransactionReceipt};
use xchain_swap::pricing::QuoteEstimator;
use xchain_swap::registry::builtin::BSC_TESTNET_CHAIN_ID;
use xchain_swap::registry::{Chain, ChainRegistry};
use xchain_swap::swap::{
    GatewayError, OrchestratorConfig, PendingSwap, RouterGateway, SwapOrchestrator, SwapRequest,
};
use xchain_swap::wallet::{Connection, ProviderError, ProviderEvent, WalletProvider, WalletSession};

pub const ACCOUNT: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0";
pub const OTHER_ACCOUNT: &str = "0xB028b84783A0381D51Dcf0e8ef04b5e502958618";
pub const BSC_ROUTER: &str = "0x1111111111111111111111111111111111111111";
pub const BNW_ROUTER: &str = "0x2222222222222222222222222222222222222222";
pub const WBNB: &str = "0xae13d989daC2f0dEbFf460aC112a837C89BAa7cd";
pub const TX_HASH: &str = "0x00000000000000000000000000000000000000000000000000000000000000aa";

pub fn addr(s: &str) -> Address {
    Address::from_string(s).unwrap()
}

pub fn registry() -> Arc<ChainRegistry> {
    Arc::new(ChainRegistry::builtin(addr(BSC_ROUTER), addr(BNW_ROUTER)).unwrap())
}

// ========== Wallet provider ==========

/// Scripted wallet. Accepted switches are confirmed with `chainChanged` unless
/// `silent_switch` is set.
pub struct MockProvider {
    account: Address,
    chain_id: Mutex<u64>,
    reject_connect: Mutex<Option<ProviderError>>,
    reject_switch: Mutex<Option<ProviderError>>,
    silent_switch: bool,
    pub connect_calls: AtomicUsize,
    pub switch_requests: Mutex<Vec<String>>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<ProviderEvent>>>,
}

impl MockProvider {
    pub fn new(account: &str, chain_id: u64) -> Self {
        Self {
            account: addr(account),
            chain_id: Mutex::new(chain_id),
            reject_connect: Mutex::new(None),
            reject_switch: Mutex::new(None),
            silent_switch: false,
            connect_calls: AtomicUsize::new(0),
            switch_requests: Mutex::new(Vec::new()),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn silent(mut self) -> Self {
        self.silent_switch = true;
        self
    }

    pub fn reject_connect_with(&self, err: ProviderError) {
        *self.reject_connect.lock() = Some(err);
    }

    pub fn reject_switch_with(&self, err: ProviderError) {
        *self.reject_switch.lock() = Some(err);
    }

    /// Pushes an event as if the wallet emitted it.
    pub fn emit(&self, event: ProviderEvent) {
        self.subscribers.lock().retain(|s| s.send(event.clone()).is_ok());
    }

    pub fn connect_count(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletProvider for MockProvider {
    async fn connect(&self) -> Result<Connection, ProviderError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.reject_connect.lock().clone() {
            return Err(err);
        }
        Ok(Connection {
            account: self.account,
            chain_id: *self.chain_id.lock(),
        })
    }

    async fn switch_chain(&self, chain_id_hex: &str) -> Result<(), ProviderError> {
        self.switch_requests.lock().push(chain_id_hex.to_string());
        if let Some(err) = self.reject_switch.lock().clone() {
            return Err(err);
        }
        if !self.silent_switch {
            let target = u64::from_str_radix(chain_id_hex.trim_start_matches("0x"), 16).unwrap();
            *self.chain_id.lock() = target;
            self.emit(ProviderEvent::ChainChanged(chain_id_hex.to_string()));
        }
        Ok(())
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<ProviderEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribers.lock().push(sender);
        receiver
    }
}

// ========== Balance source ==========

/// In-memory balances keyed by (chain, token); the zero address is the native asset.
#[derive(Default)]
pub struct MockBalanceSource {
    balances: Mutex<HashMap<(u64, Address), u128>>,
    failing: Mutex<Option<(u64, Address)>>,
    pub calls: Mutex<Vec<(u64, Address, Address)>>,
}

impl MockBalanceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, chain_id: u64, token: Address, raw: u128) {
        self.balances.lock().insert((chain_id, token), raw);
    }

    pub fn fail_on(&self, chain_id: u64, token: Address) {
        *self.failing.lock() = Some((chain_id, token));
    }

    /// Number of native-balance queries, i.e. refreshes.
    pub fn native_queries(&self) -> usize {
        self.calls.lock().iter().filter(|(_, token, _)| token.is_zero()).count()
    }

    pub fn native_queries_on(&self, chain_id: u64) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|(chain, token, _)| *chain == chain_id && token.is_zero())
            .count()
    }

    fn lookup(&self, chain_id: u64, token: Address, account: Address) -> Result<u128, ChainClientError> {
        self.calls.lock().push((chain_id, token, account));
        if *self.failing.lock() == Some((chain_id, token)) {
            return Err(ChainClientError::NetworkError("connection reset".to_string()));
        }
        Ok(self.balances.lock().get(&(chain_id, token)).copied().unwrap_or(0))
    }
}

#[async_trait]
impl BalanceSource for MockBalanceSource {
    async fn native_balance(&self, chain_id: u64, account: &Address) -> Result<u128, ChainClientError> {
        self.lookup(chain_id, Address::ZERO, *account)
    }

    async fn token_balance(&self, chain_id: u64, token: &Address, account: &Address) -> Result<u128, ChainClientError> {
        self.lookup(chain_id, *token, *account)
    }
}

// ========== Router gateway ==========

#[derive(Default)]
pub struct MockGateway {
    pub submitted: Mutex<Vec<(u64, Address, SwapRequest)>>,
    fail_submit: Mutex<Option<GatewayError>>,
    fail_confirm: Mutex<Option<GatewayError>>,
    stall_submit: Mutex<bool>,
    stall_confirm: Mutex<bool>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_submit_with(&self, err: GatewayError) {
        *self.fail_submit.lock() = Some(err);
    }

    pub fn fail_confirm_with(&self, err: GatewayError) {
        *self.fail_confirm.lock() = Some(err);
    }

    /// Broadcasts never return until cleared.
    pub fn stall_submit(&self, stall: bool) {
        *self.stall_submit.lock() = stall;
    }

    /// Receipts never arrive until cleared.
    pub fn stall_confirm(&self, stall: bool) {
        *self.stall_confirm.lock() = stall;
    }
}

#[async_trait]
impl RouterGateway for MockGateway {
    async fn submit_swap(&self, chain: &Chain, request: &SwapRequest) -> Result<PendingSwap, GatewayError> {
        let stalled = *self.stall_submit.lock();
        if stalled {
            std::future::pending::<()>().await;
        }
        if let Some(err) = self.fail_submit.lock().clone() {
            return Err(err);
        }
        self.submitted.lock().push((chain.id, chain.router, request.clone()));
        Ok(PendingSwap {
            chain_id: chain.id,
            tx_hash: TX_HASH.to_string(),
        })
    }

    async fn await_confirmation(&self, pending: &PendingSwap) -> Result<TransactionReceipt, GatewayError> {
        let stalled = *self.stall_confirm.lock();
        if stalled {
            std::future::pending::<()>().await;
        }
        if let Some(err) = self.fail_confirm.lock().clone() {
            return Err(err);
        }
        Ok(TransactionReceipt {
            tx_hash: pending.tx_hash.clone(),
            block_number: 1234,
            status: true,
            gas_used: 120_000,
            effective_gas_price: 10_000_000_000,
        })
    }
}

// ========== Wiring ==========

pub struct Harness {
    pub provider: Arc<MockProvider>,
    pub source: Arc<MockBalanceSource>,
    pub gateway: Arc<MockGateway>,
    pub orchestrator: SwapOrchestrator,
}

pub fn harness() -> Harness {
    harness_with(MockProvider::new(ACCOUNT, BSC_TESTNET_CHAIN_ID))
}

pub fn harness_with(provider: MockProvider) -> Harness {
    let provider = Arc::new(provider);
    let source = Arc::new(MockBalanceSource::new());
    let gateway = Arc::new(MockGateway::new());
    let registry = registry();
    let session = WalletSession::new(provider.clone(), registry.clone(), BSC_TESTNET_CHAIN_ID).unwrap();
    let orchestrator = SwapOrchestrator::new(
        registry,
        session,
        BalanceService::new(source.clone()),
        QuoteEstimator::default(),
        gateway.clone(),
        OrchestratorConfig::default(),
    );
    Harness {
        provider,
        source,
        gateway,
        orchestrator,
    }
}
