//! Connection state between the client and one wallet provider.
//!
//! The session is the only owner of the account, the active chain id and the
//! selected token pair. It changes in exactly two ways: a user-initiated
//! `connect`, or a provider event applied through `process_events`/`await_chain`.
//! A chain switch request never updates local state by itself; the wallet's
//! `chainChanged` confirmation does.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::mpsc;

use crate::chain::parsers::{parse_hex_chain_id, to_hex_chain_id};
use crate::core::base_types::Address;
use crate::errors::SwapAppError;
use crate::registry::{Chain, ChainRegistry};
use crate::swap::request::ValidationError;

use super::provider::{Connection, ProviderEvent, WalletProvider};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub account: Option<Address>,
    pub active_chain_id: u64,
    pub from_token: Option<Address>,
    pub to_token: Option<Address>,
}

impl Session {
    fn disconnected(chain_id: u64) -> Self {
        Self {
            account: None,
            active_chain_id: chain_id,
            from_token: None,
            to_token: None,
        }
    }
}

/// What a processed provider event did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    AccountChanged(Address),
    ChainChanged(u64),
    Disconnected,
    /// The event carried nothing new or was dropped (see log).
    Unchanged,
}

pub struct WalletSession {
    provider: Arc<dyn WalletProvider>,
    registry: Arc<ChainRegistry>,
    session: Session,
    events: Option<mpsc::UnboundedReceiver<ProviderEvent>>,
}

impl WalletSession {
    /// Starts disconnected on `default_chain_id`, which must be one of the registry's chains.
    pub fn new(
        provider: Arc<dyn WalletProvider>,
        registry: Arc<ChainRegistry>,
        default_chain_id: u64,
    ) -> Result<Self, SwapAppError> {
        registry.resolve(default_chain_id)?;
        Ok(Self {
            provider,
            registry,
            session: Session::disconnected(default_chain_id),
            events: None,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_connected(&self) -> bool {
        self.session.account.is_some()
    }

    pub fn account(&self) -> Option<Address> {
        self.session.account
    }

    pub fn active_chain_id(&self) -> u64 {
        self.session.active_chain_id
    }

    pub fn active_chain(&self) -> Result<&Chain, SwapAppError> {
        Ok(self.registry.resolve(self.session.active_chain_id)?)
    }

    pub fn destination_chain(&self) -> Result<&Chain, SwapAppError> {
        Ok(self.registry.pair_of(self.session.active_chain_id)?)
    }

    /// Runs the provider's connect flow once and keeps the resulting session.
    ///
    /// Calling it again while connected returns the current connection without
    /// reopening the wallet. On any failure the session stays disconnected.
    pub async fn connect(&mut self) -> Result<Connection, SwapAppError> {
        if let Some(account) = self.session.account {
            debug!("already connected as {}", account);
            return Ok(Connection {
                account,
                chain_id: self.session.active_chain_id,
            });
        }

        let connection = self.provider.connect().await.map_err(SwapAppError::Connection)?;
        self.registry.resolve(connection.chain_id)?;

        if self.events.is_none() {
            self.events = Some(self.provider.subscribe());
        }
        self.session.account = Some(connection.account);
        self.session.active_chain_id = connection.chain_id;
        self.reset_pair();
        info!("wallet session connected: {} on chain {}", connection.account, connection.chain_id);
        Ok(connection)
    }

    pub fn on_account_changed(&mut self, accounts: &[String]) -> SessionChange {
        let Some(first) = accounts.first() else {
            info!("wallet revoked account access");
            return self.on_disconnect();
        };
        match Address::from_string(first) {
            Ok(account) if Some(account) == self.session.account => SessionChange::Unchanged,
            Ok(account) => {
                info!("active account changed to {}", account);
                self.session.account = Some(account);
                SessionChange::AccountChanged(account)
            }
            Err(e) => {
                warn!("ignoring accountsChanged with malformed address {}: {}", first, e);
                SessionChange::Unchanged
            }
        }
    }

    /// Applies a `chainChanged` confirmation. Chains outside the registry are
    /// rejected and the session keeps its current chain.
    pub fn on_chain_changed(&mut self, chain_id_hex: &str) -> Result<SessionChange, SwapAppError> {
        let chain_id = parse_hex_chain_id(chain_id_hex)
            .map_err(|e| SwapAppError::ChainSwitch(format!("wallet reported {}: {}", chain_id_hex, e)))?;
        if chain_id == self.session.active_chain_id {
            return Ok(SessionChange::Unchanged);
        }
        if !self.registry.is_supported(chain_id) {
            warn!("wallet moved to unsupported chain {}; keeping {}", chain_id, self.session.active_chain_id);
            return Err(SwapAppError::UnsupportedChain(chain_id));
        }
        info!("active chain changed {} -> {}", self.session.active_chain_id, chain_id);
        self.session.active_chain_id = chain_id;
        self.reset_pair();
        Ok(SessionChange::ChainChanged(chain_id))
    }

    pub fn on_disconnect(&mut self) -> SessionChange {
        if self.session.account.is_none() {
            return SessionChange::Unchanged;
        }
        self.session = Session::disconnected(self.session.active_chain_id);
        SessionChange::Disconnected
    }

    /// Applies one provider event.
    pub fn apply(&mut self, event: ProviderEvent) -> Result<SessionChange, SwapAppError> {
        match event {
            ProviderEvent::AccountsChanged(accounts) => Ok(self.on_account_changed(&accounts)),
            ProviderEvent::ChainChanged(chain_id_hex) => self.on_chain_changed(&chain_id_hex),
            ProviderEvent::Disconnect => Ok(self.on_disconnect()),
        }
    }

    /// Applies every queued provider event, in arrival order.
    pub fn process_events(&mut self) -> Vec<Result<SessionChange, SwapAppError>> {
        let mut queued = Vec::new();
        if let Some(events) = self.events.as_mut() {
            while let Ok(event) = events.try_recv() {
                queued.push(event);
            }
        }
        queued.into_iter().map(|event| self.apply(event)).collect()
    }

    /// Sends a switch request for `target`. Local state is untouched until the
    /// wallet confirms with `chainChanged`; see `await_chain`.
    pub async fn switch_chain(&mut self, target: u64) -> Result<(), SwapAppError> {
        if !self.is_connected() {
            return Err(SwapAppError::ChainSwitch("wallet is not connected".to_string()));
        }
        self.registry.resolve(target)?;
        if target == self.session.active_chain_id {
            return Ok(());
        }
        let chain_id_hex = to_hex_chain_id(target);
        info!("requesting wallet switch to chain {} ({})", target, chain_id_hex);
        self.provider
            .switch_chain(&chain_id_hex)
            .await
            .map_err(|e| SwapAppError::ChainSwitch(e.to_string()))
    }

    /// Applies provider events as they arrive until `target` is the active chain.
    /// Returns every change applied on the way.
    pub async fn await_chain(&mut self, target: u64) -> Result<Vec<SessionChange>, SwapAppError> {
        let mut applied = Vec::new();
        while self.session.active_chain_id != target {
            let event = match self.events.as_mut() {
                Some(events) => events.recv().await,
                None => None,
            };
            let Some(event) = event else {
                return Err(SwapAppError::ChainSwitch(format!(
                    "wallet stopped sending events before confirming chain {}",
                    target
                )));
            };
            match self.apply(event) {
                Ok(SessionChange::Disconnected) => {
                    return Err(SwapAppError::ChainSwitch("wallet disconnected during switch".to_string()))
                }
                Ok(change) => applied.push(change),
                Err(e) => warn!("while waiting for chain {}: {}", target, e),
            }
        }
        Ok(applied)
    }

    /// Chooses the swap pair. `from` must be on the active chain, `to` on its pair.
    pub fn select_pair(&mut self, from: Address, to: Address) -> Result<(), SwapAppError> {
        let source = self.active_chain()?;
        if !source.contains_token(&from) {
            return Err(ValidationError::TokenNotOnChain { token: from, chain_id: source.id }.into());
        }
        let destination = self.destination_chain()?;
        if !destination.contains_token(&to) {
            return Err(ValidationError::TokenNotOnChain { token: to, chain_id: destination.id }.into());
        }
        self.session.from_token = Some(from);
        self.session.to_token = Some(to);
        Ok(())
    }

    /// Native asset of the active chain → native asset of its pair.
    fn reset_pair(&mut self) {
        let source = self.registry.resolve(self.session.active_chain_id).ok();
        let destination = self.registry.pair_of(self.session.active_chain_id).ok();
        self.session.from_token = source.and_then(|c| c.native_token()).map(|t| t.address);
        self.session.to_token = destination.and_then(|c| c.native_token()).map(|t| t.address);
    }
}
