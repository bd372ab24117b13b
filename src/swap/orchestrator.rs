//! Drives one wallet session from connect through a confirmed cross-chain swap.
//!
//! Every user-visible outcome is also queued as a `Notification`; callers drain
//! them with `drain_notifications` after each action.

use std::sync::Arc;

use chrono::Utc;
use log::{error, info, warn};
use rust_decimal::Decimal;

use crate::balance::{BalanceService, BalanceSnapshot};
use crate::core::base_types::TokenAmount;
use crate::errors::SwapAppError;
use crate::pricing::{Quote, QuoteEstimator};
use crate::registry::{ChainRegistry, RegistryError};
use crate::wallet::{Connection, SessionChange, WalletSession};

use super::gateway::{PendingSwap, RouterGateway, SwapReceipt};
use super::notification::Notification;
use super::request::{
    parse_positive_amount, parse_token_field, SwapForm, SwapRequest, ValidatedSwap, ValidationError,
    DEADLINE_WINDOW_SECS,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Relay fee attached to every swap, in the source chain's native asset
    pub fee_value: Decimal,
    pub deadline_window_secs: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            fee_value: Decimal::new(1, 2),
            deadline_window_secs: DEADLINE_WINDOW_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapStatus {
    Idle,
    /// Validated, being signed and broadcast
    Pending,
    /// Broadcast, waiting for the receipt. Stays set if the wait is dropped;
    /// `resume_pending` picks it up again.
    Submitted(String),
    Confirmed(String),
    Failed(String),
}

/// Result of a confirmed swap.
#[derive(Debug, Clone)]
pub struct SwapOutcome {
    pub request: SwapRequest,
    pub receipt: SwapReceipt,
    /// `None` when the post-swap refresh failed; the swap itself still succeeded.
    pub balances: Option<BalanceSnapshot>,
}

/// A broadcast swap whose receipt has not been seen yet.
#[derive(Debug, Clone)]
struct InFlightSwap {
    pending: PendingSwap,
    request: SwapRequest,
}

/// Marks a swap `Failed` if its broadcast future is dropped before finishing.
struct BroadcastGuard<'a> {
    status: &'a mut SwapStatus,
    armed: bool,
}

impl<'a> BroadcastGuard<'a> {
    fn start(status: &'a mut SwapStatus) -> Self {
        *status = SwapStatus::Pending;
        Self { status, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for BroadcastGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("swap broadcast was cancelled");
            *self.status = SwapStatus::Failed("swap cancelled before broadcast completed".to_string());
        }
    }
}

pub struct SwapOrchestrator {
    registry: Arc<ChainRegistry>,
    session: WalletSession,
    balances: BalanceService,
    quotes: QuoteEstimator,
    gateway: Arc<dyn RouterGateway>,
    config: OrchestratorConfig,
    status: SwapStatus,
    in_flight: Option<InFlightSwap>,
    snapshot: Option<BalanceSnapshot>,
    notifications: Vec<Notification>,
}

impl SwapOrchestrator {
    pub fn new(
        registry: Arc<ChainRegistry>,
        session: WalletSession,
        balances: BalanceService,
        quotes: QuoteEstimator,
        gateway: Arc<dyn RouterGateway>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            registry,
            session,
            balances,
            quotes,
            gateway,
            config,
            status: SwapStatus::Idle,
            in_flight: None,
            snapshot: None,
            notifications: Vec::new(),
        }
    }

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut WalletSession {
        &mut self.session
    }

    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    pub fn status(&self) -> &SwapStatus {
        &self.status
    }

    pub fn snapshot(&self) -> Option<&BalanceSnapshot> {
        self.snapshot.as_ref()
    }

    /// True while a submitted swap has not yet confirmed or failed.
    pub fn is_busy(&self) -> bool {
        matches!(self.status, SwapStatus::Pending | SwapStatus::Submitted(_))
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn report(&mut self, err: SwapAppError) -> SwapAppError {
        warn!("{}: {}", err.title(), err);
        self.notifications.push(Notification::error(&err));
        err
    }

    /// Connects the wallet and loads balances for the connected chain.
    ///
    /// A failed balance load is reported but does not undo the connection.
    pub async fn connect(&mut self) -> Result<Connection, SwapAppError> {
        let was_connected = self.session.is_connected();
        let connection = match self.session.connect().await {
            Ok(connection) => connection,
            Err(e) => return Err(self.report(e)),
        };
        if !was_connected {
            self.notifications.push(Notification::info(
                "Wallet connected",
                format!("{} on chain {}", connection.account, connection.chain_id),
            ));
        }
        let _ = self.refresh_balances().await;
        Ok(connection)
    }

    /// Rebuilds the snapshot for the active chain. On failure the previous snapshot stays.
    pub async fn refresh_balances(&mut self) -> Result<&BalanceSnapshot, SwapAppError> {
        let refreshed = match self.session.active_chain() {
            Ok(chain) => self
                .balances
                .refresh(self.session.session(), chain)
                .await
                .map_err(SwapAppError::from),
            Err(e) => Err(e),
        };
        match refreshed {
            Ok(snapshot) => Ok(&*self.snapshot.insert(snapshot)),
            Err(e) => Err(self.report(e)),
        }
    }

    /// Asks the wallet to move to `target` and waits for it to confirm.
    ///
    /// Balances are reloaded once after the confirmation. If the wallet refuses,
    /// the session keeps its chain and no reload happens.
    pub async fn switch_chain(&mut self, target: u64) -> Result<(), SwapAppError> {
        if target == self.session.active_chain_id() && self.session.is_connected() {
            return Ok(());
        }
        if let Err(e) = self.session.switch_chain(target).await {
            return Err(self.report(e));
        }
        if let Err(e) = self.session.await_chain(target).await {
            return Err(self.report(e));
        }
        let chain_name = self.registry.resolve(target).map(|c| c.name.clone())?;
        self.notifications
            .push(Notification::info("Network switched", format!("Now on {}", chain_name)));
        let _ = self.refresh_balances().await;
        Ok(())
    }

    /// Applies queued wallet events. Balances are reloaded once if the account or
    /// chain changed; a disconnect drops them.
    pub async fn process_events(&mut self) -> Vec<SessionChange> {
        let mut changes = Vec::new();
        for result in self.session.process_events() {
            match result {
                Ok(SessionChange::Unchanged) => {}
                Ok(change) => changes.push(change),
                Err(e) => {
                    self.report(e);
                }
            }
        }

        if changes.contains(&SessionChange::Disconnected) && !self.session.is_connected() {
            self.snapshot = None;
            self.notifications
                .push(Notification::info("Wallet disconnected", "Connect again to continue"));
        } else if !changes.is_empty() && self.session.is_connected() {
            let _ = self.refresh_balances().await;
        }
        changes
    }

    /// Placeholder estimate for `amount_in`. Pure; no network access.
    pub fn quote(&self, amount_in: &str) -> Result<Quote, ValidationError> {
        Ok(self.quotes.estimate(parse_positive_amount(amount_in)?))
    }

    /// Checks the form without touching the network.
    pub fn validate(&self, form: &SwapForm) -> Result<ValidatedSwap, ValidationError> {
        let account = self.session.account().ok_or(ValidationError::NotConnected)?;
        let amount_in = parse_positive_amount(&form.amount_in)?;
        let from_token = parse_token_field(&form.from_token, ValidationError::MissingFromToken)?;
        let to_token = parse_token_field(&form.to_token, ValidationError::MissingToToken)?;
        let amount_out_min = match form.amount_out_min.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let value = raw
                    .parse::<Decimal>()
                    .map_err(|_| ValidationError::InvalidMinOut(raw.to_string()))?;
                if value.is_sign_negative() && !value.is_zero() {
                    return Err(ValidationError::InvalidMinOut(raw.to_string()));
                }
                Some(value)
            }
        };
        Ok(ValidatedSwap {
            account,
            from_token,
            to_token,
            amount_in,
            amount_out_min,
        })
    }

    /// Turns a valid form into the router call parameters, as of unix time `now`.
    pub fn build_request(&self, form: &SwapForm, now: u64) -> Result<SwapRequest, SwapAppError> {
        let validated = self.validate(form)?;
        let source = self.session.active_chain()?;
        let destination = self.session.destination_chain()?;

        let token_in = source
            .token_by_address(&validated.from_token)
            .ok_or(ValidationError::TokenNotOnChain {
                token: validated.from_token,
                chain_id: source.id,
            })?;
        let token_out = destination
            .token_by_address(&validated.to_token)
            .ok_or(ValidationError::TokenNotOnChain {
                token: validated.to_token,
                chain_id: destination.id,
            })?;
        let native = source
            .native_token()
            .ok_or(RegistryError::MissingNativeToken(source.id))?;

        let amount_in = TokenAmount::from_human(
            &validated.amount_in.normalize().to_string(),
            token_in.decimals,
            Some(token_in.symbol.clone()),
        )
        .map_err(|source| ValidationError::Amount {
            symbol: token_in.symbol.clone(),
            source,
        })?;
        if amount_in.is_zero() {
            return Err(ValidationError::NonPositiveAmount(form.amount_in.trim().to_string()).into());
        }

        let min_out = validated
            .amount_out_min
            .unwrap_or_else(|| self.quotes.estimate(validated.amount_in).amount_out_min);
        let amount_out_min = TokenAmount::from_decimal(min_out, token_out.decimals, Some(token_out.symbol.clone()))
            .map_err(|source| ValidationError::Amount {
                symbol: token_out.symbol.clone(),
                source,
            })?;

        let fee_value = TokenAmount::from_decimal(self.config.fee_value, native.decimals, Some(native.symbol.clone()))
            .map_err(|source| ValidationError::Amount {
                symbol: native.symbol.clone(),
                source,
            })?;

        Ok(SwapRequest {
            from_token: token_in.address,
            to_token: token_out.address,
            amount_in,
            amount_out_min,
            dst_chain_id: destination.id,
            deadline: now.saturating_add(self.config.deadline_window_secs),
            fee_value,
        })
    }

    /// Validates, submits and confirms one swap, then reloads balances once.
    ///
    /// Refused while an earlier broadcast swap is still unconfirmed. Nothing is retried.
    pub async fn submit(&mut self, form: &SwapForm) -> Result<SwapOutcome, SwapAppError> {
        if self.is_busy() {
            return Err(self.report(ValidationError::SwapPending.into()));
        }
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
        let request = match self.build_request(form, now) {
            Ok(request) => request,
            Err(e) => return Err(self.report(e)),
        };
        let chain = match self.session.active_chain() {
            Ok(chain) => chain.clone(),
            Err(e) => return Err(self.report(e)),
        };

        info!(
            "submitting swap of {} on {} -> chain {} (min out {}, fee {})",
            request.amount_in, chain.name, request.dst_chain_id, request.amount_out_min, request.fee_value
        );
        let broadcast = {
            let mut guard = BroadcastGuard::start(&mut self.status);
            let result = self.gateway.submit_swap(&chain, &request).await;
            guard.disarm();
            result
        };
        let pending = match broadcast {
            Ok(pending) => pending,
            Err(e) => return Err(self.fail(e.into())),
        };
        self.status = SwapStatus::Submitted(pending.tx_hash.clone());
        let swap = InFlightSwap { pending, request };
        self.in_flight = Some(swap.clone());
        self.confirm(swap).await
    }

    /// Waits again for a broadcast swap whose earlier `submit` was dropped.
    ///
    /// Returns `Ok(None)` when nothing is in flight.
    pub async fn resume_pending(&mut self) -> Result<Option<SwapOutcome>, SwapAppError> {
        let Some(swap) = self.in_flight.clone() else {
            return Ok(None);
        };
        info!("resuming wait for swap {}", swap.pending.tx_hash);
        self.confirm(swap).await.map(Some)
    }

    async fn confirm(&mut self, swap: InFlightSwap) -> Result<SwapOutcome, SwapAppError> {
        let confirmation = self.gateway.await_confirmation(&swap.pending).await;
        self.in_flight = None;
        let receipt = match confirmation {
            Ok(receipt) => receipt,
            Err(e) => return Err(self.fail(e.into())),
        };
        self.status = SwapStatus::Confirmed(receipt.tx_hash.clone());
        self.notifications.push(Notification::success(
            "Success",
            format!("Swap transaction completed! ({})", receipt.tx_hash),
        ));

        let balances = self.refresh_balances().await.ok().cloned();
        Ok(SwapOutcome {
            request: swap.request,
            receipt,
            balances,
        })
    }

    fn fail(&mut self, err: SwapAppError) -> SwapAppError {
        error!("swap failed: {}", err);
        self.status = SwapStatus::Failed(err.to_string());
        self.report(err)
    }
}
