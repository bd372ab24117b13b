mod common;

use std::time::Duration;

use tokio::time::timeout;

use common::{addr, harness, harness_with, MockProvider, ACCOUNT, BNW_ROUTER, BSC_ROUTER, TX_HASH, WBNB};
use xchain_swap::core::base_types::{Address, TokenAmountError};
use xchain_swap::errors::SwapAppError;
use xchain_swap::swap::{GatewayError, NotificationLevel, SwapForm, SwapStatus, ValidationError};
use xchain_swap::wallet::{ProviderError, ProviderEvent, SessionChange};

const ZERO: &str = "0x0000000000000000000000000000000000000000";
const NOW: u64 = 1_700_000_000;

fn native_form(amount: &str) -> SwapForm {
    SwapForm::new(ZERO, ZERO, amount)
}

// ========== connect ==========

#[tokio::test]
async fn test_connect_loads_balances_of_connected_chain() {
    let mut h = harness();
    h.source.set(97, Address::ZERO, 2_000_000_000_000_000_000);

    let connection = h.orchestrator.connect().await.unwrap();
    assert_eq!(connection.chain_id, 97);

    let snapshot = h.orchestrator.snapshot().unwrap();
    assert_eq!(snapshot.account, addr(ACCOUNT));
    assert_eq!(snapshot.chain_id, 97);
    assert_eq!(snapshot.get(&Address::ZERO), Some("2"));
    assert_eq!(h.source.native_queries(), 1);

    let notifications = h.orchestrator.drain_notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].level, NotificationLevel::Info);
    assert!(h.orchestrator.drain_notifications().is_empty());
}

#[tokio::test]
async fn test_connect_failure_is_notified() {
    let h = harness();
    h.provider.reject_connect_with(ProviderError::UserRejected);
    let mut orchestrator = h.orchestrator;

    let err = orchestrator.connect().await.unwrap_err();
    assert!(matches!(err, SwapAppError::Connection(_)));
    assert!(orchestrator.snapshot().is_none());
    assert_eq!(h.source.native_queries(), 0);

    let notifications = orchestrator.drain_notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].level, NotificationLevel::Error);
    assert_eq!(notifications[0].title, "Connection failed");
}

#[tokio::test]
async fn test_connect_keeps_session_when_balances_fail() {
    let mut h = harness();
    h.source.fail_on(97, addr(WBNB));

    h.orchestrator.connect().await.unwrap();
    assert!(h.orchestrator.session().is_connected());
    // nothing loaded yet, so nothing to keep
    assert!(h.orchestrator.snapshot().is_none());
    let titles: Vec<_> = h.orchestrator.drain_notifications().into_iter().map(|n| n.title).collect();
    assert_eq!(titles, vec!["Wallet connected", "Balance refresh failed"]);
}

// ========== refresh_balances ==========

#[tokio::test]
async fn test_failed_refresh_keeps_previous_balances() {
    let mut h = harness();
    h.source.set(97, Address::ZERO, 2_000_000_000_000_000_000);
    h.orchestrator.connect().await.unwrap();
    h.orchestrator.drain_notifications();

    h.source.fail_on(97, addr(WBNB));
    assert!(matches!(
        h.orchestrator.refresh_balances().await,
        Err(SwapAppError::BalanceFetch(_))
    ));

    let snapshot = h.orchestrator.snapshot().unwrap();
    assert_eq!(snapshot.chain_id, 97);
    assert_eq!(snapshot.get(&Address::ZERO), Some("2"));
    let notifications = h.orchestrator.drain_notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].title, "Balance refresh failed");
}

// ========== switch_chain ==========

#[tokio::test]
async fn test_failed_switch_keeps_chain_and_skips_refresh() {
    let mut h = harness();
    h.orchestrator.connect().await.unwrap();
    h.provider.reject_switch_with(ProviderError::UserRejected);
    let queries_before = h.source.native_queries();

    let err = h.orchestrator.switch_chain(714).await.unwrap_err();
    assert!(matches!(err, SwapAppError::ChainSwitch(_)));
    assert_eq!(h.orchestrator.session().active_chain_id(), 97);
    assert_eq!(h.source.native_queries(), queries_before);
    assert_eq!(h.orchestrator.snapshot().unwrap().chain_id, 97);
}

#[tokio::test]
async fn test_switch_refreshes_once_on_new_chain() {
    let mut h = harness();
    h.source.set(714, Address::ZERO, 5_000_000_000_000_000_000);
    h.orchestrator.connect().await.unwrap();

    h.orchestrator.switch_chain(714).await.unwrap();
    assert_eq!(h.orchestrator.session().active_chain_id(), 714);
    assert_eq!(h.source.native_queries_on(714), 1);

    let snapshot = h.orchestrator.snapshot().unwrap();
    assert_eq!(snapshot.chain_id, 714);
    assert_eq!(snapshot.get(&Address::ZERO), Some("5"));
}

#[tokio::test]
async fn test_switch_to_active_chain_is_noop() {
    let mut h = harness();
    h.orchestrator.connect().await.unwrap();
    h.orchestrator.switch_chain(97).await.unwrap();
    assert!(h.provider.switch_requests.lock().is_empty());
    assert_eq!(h.source.native_queries(), 1);
}

// ========== process_events ==========

#[tokio::test]
async fn test_chain_change_from_wallet_triggers_one_refresh() {
    let mut h = harness();
    h.orchestrator.connect().await.unwrap();

    h.provider.emit(ProviderEvent::ChainChanged("0x2ca".to_string()));
    h.provider.emit(ProviderEvent::AccountsChanged(vec![ACCOUNT.to_string()]));
    let changes = h.orchestrator.process_events().await;

    assert_eq!(changes, vec![SessionChange::ChainChanged(714)]);
    assert_eq!(h.source.native_queries_on(714), 1);
    assert_eq!(h.orchestrator.snapshot().unwrap().chain_id, 714);
}

#[tokio::test]
async fn test_unsupported_chain_event_is_reported() {
    let mut h = harness();
    h.orchestrator.connect().await.unwrap();
    h.orchestrator.drain_notifications();

    h.provider.emit(ProviderEvent::ChainChanged("0x38".to_string()));
    let changes = h.orchestrator.process_events().await;

    assert!(changes.is_empty());
    assert_eq!(h.orchestrator.session().active_chain_id(), 97);
    let notifications = h.orchestrator.drain_notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].title, "Unsupported network");
}

#[tokio::test]
async fn test_disconnect_event_drops_snapshot() {
    let mut h = harness();
    h.orchestrator.connect().await.unwrap();
    h.provider.emit(ProviderEvent::AccountsChanged(vec![]));

    let changes = h.orchestrator.process_events().await;
    assert_eq!(changes, vec![SessionChange::Disconnected]);
    assert!(h.orchestrator.snapshot().is_none());
    assert!(!h.orchestrator.session().is_connected());
}

// ========== quote / validate ==========

#[tokio::test]
async fn test_quote_display() {
    let h = harness();
    let quote = h.orchestrator.quote("1.0").unwrap();
    assert_eq!(quote.amount_out_min_display(), "0.98");
    assert_eq!(quote.price_impact_display(), "2.00");
    assert_eq!(h.orchestrator.quote("0"), Err(ValidationError::NonPositiveAmount("0".to_string())));
}

#[tokio::test]
async fn test_validate_requires_connection() {
    let h = harness();
    assert_eq!(h.orchestrator.validate(&native_form("1")), Err(ValidationError::NotConnected));
}

#[tokio::test]
async fn test_validate_rejects_bad_forms() {
    let mut h = harness();
    h.orchestrator.connect().await.unwrap();
    let o = &h.orchestrator;

    assert_eq!(o.validate(&native_form("")), Err(ValidationError::MissingAmount));
    assert_eq!(o.validate(&native_form("0")), Err(ValidationError::NonPositiveAmount("0".to_string())));
    assert_eq!(o.validate(&native_form("-2")), Err(ValidationError::NonPositiveAmount("-2".to_string())));
    assert_eq!(o.validate(&native_form("ten")), Err(ValidationError::UnparsableAmount("ten".to_string())));
    assert_eq!(o.validate(&SwapForm::new("", ZERO, "1")), Err(ValidationError::MissingFromToken));
    assert_eq!(o.validate(&SwapForm::new(ZERO, " ", "1")), Err(ValidationError::MissingToToken));
    assert!(matches!(
        o.validate(&SwapForm::new("0x1234", ZERO, "1")),
        Err(ValidationError::InvalidAddress(_, _))
    ));
    assert!(matches!(
        o.validate(&native_form("1").with_min_out("-1")),
        Err(ValidationError::InvalidMinOut(_))
    ));
}

#[tokio::test]
async fn test_validate_accepts_good_form() {
    let mut h = harness();
    h.orchestrator.connect().await.unwrap();

    let validated = h.orchestrator.validate(&SwapForm::new(WBNB, ZERO, " 2.5 ").with_min_out("")).unwrap();
    assert_eq!(validated.account, addr(ACCOUNT));
    assert_eq!(validated.from_token, addr(WBNB));
    assert_eq!(validated.amount_in.to_string(), "2.5");
    assert_eq!(validated.amount_out_min, None);
}

// ========== build_request ==========

#[tokio::test]
async fn test_build_request_from_bsc() {
    let mut h = harness();
    h.orchestrator.connect().await.unwrap();

    let request = h.orchestrator.build_request(&native_form("1.0"), NOW).unwrap();
    assert_eq!(request.from_token, Address::ZERO);
    assert_eq!(request.to_token, Address::ZERO);
    assert_eq!(request.amount_in.raw, 1_000_000_000_000_000_000);
    assert_eq!(request.amount_out_min.raw, 980_000_000_000_000_000);
    assert_eq!(request.amount_out_min.symbol.as_deref(), Some("BNW"));
    assert_eq!(request.dst_chain_id, 714);
    assert_eq!(request.deadline, NOW + 3600);
    assert_eq!(request.fee_value.raw, 10_000_000_000_000_000);
    assert_eq!(request.fee_value.symbol.as_deref(), Some("BNB"));
}

#[tokio::test]
async fn test_build_request_explicit_min_out_truncates() {
    let mut h = harness();
    h.orchestrator.connect().await.unwrap();

    let form = SwapForm::new(WBNB, ZERO, "3").with_min_out("1.0000000000000000019");
    let request = h.orchestrator.build_request(&form, NOW).unwrap();
    assert_eq!(request.from_token, addr(WBNB));
    assert_eq!(request.amount_out_min.raw, 1_000_000_000_000_000_001);
}

#[tokio::test]
async fn test_build_request_checks_token_membership() {
    let mut h = harness();
    h.orchestrator.connect().await.unwrap();

    let err = h.orchestrator.build_request(&SwapForm::new(ZERO, WBNB, "1"), NOW).unwrap_err();
    assert!(matches!(
        err,
        SwapAppError::Validation(ValidationError::TokenNotOnChain { chain_id: 714, .. })
    ));

    let unknown = "0x3333333333333333333333333333333333333333";
    let err = h.orchestrator.build_request(&SwapForm::new(unknown, ZERO, "1"), NOW).unwrap_err();
    assert!(matches!(
        err,
        SwapAppError::Validation(ValidationError::TokenNotOnChain { chain_id: 97, .. })
    ));
}

#[tokio::test]
async fn test_build_request_rejects_excess_precision() {
    let mut h = harness();
    h.orchestrator.connect().await.unwrap();

    let err = h.orchestrator.build_request(&native_form("0.0000000000000000001"), NOW).unwrap_err();
    assert!(matches!(
        err,
        SwapAppError::Validation(ValidationError::Amount {
            source: TokenAmountError::TooManyDecimals(19, 18),
            ..
        })
    ));
}

// ========== submit ==========

#[tokio::test]
async fn test_submit_confirms_and_refreshes_once() {
    let mut h = harness();
    h.orchestrator.connect().await.unwrap();
    let queries_before = h.source.native_queries();

    let outcome = h.orchestrator.submit(&native_form("1")).await.unwrap();
    assert_eq!(outcome.receipt.tx_hash, TX_HASH);
    assert_eq!(*h.orchestrator.status(), SwapStatus::Confirmed(TX_HASH.to_string()));
    assert!(!h.orchestrator.is_busy());

    assert_eq!(h.source.native_queries(), queries_before + 1);
    let balances = outcome.balances.unwrap();
    assert_eq!(balances.account, addr(ACCOUNT));
    assert_eq!(balances.chain_id, 97);

    let submitted = h.gateway.submitted.lock();
    assert_eq!(submitted.len(), 1);
    let (chain_id, router, request) = &submitted[0];
    assert_eq!(*chain_id, 97);
    assert_eq!(*router, addr(BSC_ROUTER));
    assert_eq!(request.dst_chain_id, 714);
    assert!(request.deadline > NOW);

    let notifications = h.orchestrator.drain_notifications();
    assert_eq!(notifications.last().unwrap().level, NotificationLevel::Success);
}

#[tokio::test]
async fn test_submit_from_bnw_uses_its_router() {
    let mut h = harness_with(MockProvider::new(ACCOUNT, 714));
    h.orchestrator.connect().await.unwrap();

    h.orchestrator.submit(&native_form("0.5")).await.unwrap();
    let submitted = h.gateway.submitted.lock();
    assert_eq!(submitted[0].0, 714);
    assert_eq!(submitted[0].1, addr(BNW_ROUTER));
    assert_eq!(submitted[0].2.dst_chain_id, 97);
    assert_eq!(submitted[0].2.fee_value.symbol.as_deref(), Some("BNW"));
}

#[tokio::test]
async fn test_submit_revert_fails_without_refresh() {
    let mut h = harness();
    h.orchestrator.connect().await.unwrap();
    h.gateway.fail_confirm_with(GatewayError::Reverted(TX_HASH.to_string()));
    let queries_before = h.source.native_queries();

    let err = h.orchestrator.submit(&native_form("1")).await.unwrap_err();
    assert!(matches!(err, SwapAppError::SwapExecution(GatewayError::Reverted(_))));
    assert!(matches!(h.orchestrator.status(), SwapStatus::Failed(_)));
    assert!(!h.orchestrator.is_busy());
    assert_eq!(h.source.native_queries(), queries_before);
}

#[tokio::test]
async fn test_submit_rejected_by_node() {
    let mut h = harness();
    h.orchestrator.connect().await.unwrap();
    h.gateway.fail_submit_with(GatewayError::Rejected("insufficient funds".to_string()));

    let err = h.orchestrator.submit(&native_form("1")).await.unwrap_err();
    assert!(matches!(err, SwapAppError::SwapExecution(GatewayError::Rejected(_))));
    assert!(h.gateway.submitted.lock().is_empty());

    let notifications = h.orchestrator.drain_notifications();
    let last = notifications.last().unwrap();
    assert_eq!(last.level, NotificationLevel::Error);
    assert_eq!(last.title, "Swap failed");
}

#[tokio::test]
async fn test_submit_invalid_form_sends_nothing() {
    let mut h = harness();
    h.orchestrator.connect().await.unwrap();

    let err = h.orchestrator.submit(&native_form("")).await.unwrap_err();
    assert!(matches!(err, SwapAppError::Validation(ValidationError::MissingAmount)));
    assert!(h.gateway.submitted.lock().is_empty());
    assert_eq!(*h.orchestrator.status(), SwapStatus::Idle);
}

#[tokio::test]
async fn test_submit_requires_connection() {
    let mut h = harness();
    let err = h.orchestrator.submit(&native_form("1")).await.unwrap_err();
    assert!(matches!(err, SwapAppError::Validation(ValidationError::NotConnected)));
}

#[tokio::test]
async fn test_submit_keeps_previous_balances_when_refresh_fails() {
    let mut h = harness();
    h.source.set(97, Address::ZERO, 2_000_000_000_000_000_000);
    h.orchestrator.connect().await.unwrap();
    h.source.fail_on(97, addr(WBNB));

    let outcome = h.orchestrator.submit(&native_form("1")).await.unwrap();
    assert_eq!(*h.orchestrator.status(), SwapStatus::Confirmed(TX_HASH.to_string()));
    assert!(outcome.balances.is_none());
    assert_eq!(h.orchestrator.snapshot().unwrap().get(&Address::ZERO), Some("2"));
}

// ========== dropped submissions ==========

#[tokio::test]
async fn test_dropped_broadcast_frees_the_swap_action() {
    let mut h = harness();
    h.orchestrator.connect().await.unwrap();
    h.gateway.stall_submit(true);

    let attempt = timeout(Duration::from_millis(50), h.orchestrator.submit(&native_form("1"))).await;
    assert!(attempt.is_err());
    assert!(matches!(h.orchestrator.status(), SwapStatus::Failed(_)));
    assert!(!h.orchestrator.is_busy());

    h.gateway.stall_submit(false);
    h.orchestrator.submit(&native_form("1")).await.unwrap();
    assert_eq!(h.gateway.submitted.lock().len(), 1);
}

#[tokio::test]
async fn test_unconfirmed_swap_blocks_new_submission_until_resumed() {
    let mut h = harness();
    h.orchestrator.connect().await.unwrap();
    h.gateway.stall_confirm(true);

    let attempt = timeout(Duration::from_millis(50), h.orchestrator.submit(&native_form("1"))).await;
    assert!(attempt.is_err());
    assert_eq!(*h.orchestrator.status(), SwapStatus::Submitted(TX_HASH.to_string()));
    assert!(h.orchestrator.is_busy());

    let err = h.orchestrator.submit(&native_form("2")).await.unwrap_err();
    assert!(matches!(err, SwapAppError::Validation(ValidationError::SwapPending)));
    assert_eq!(h.gateway.submitted.lock().len(), 1);

    h.gateway.stall_confirm(false);
    let outcome = h.orchestrator.resume_pending().await.unwrap().unwrap();
    assert_eq!(outcome.receipt.tx_hash, TX_HASH);
    assert_eq!(outcome.request.amount_in.raw, 1_000_000_000_000_000_000);
    assert_eq!(*h.orchestrator.status(), SwapStatus::Confirmed(TX_HASH.to_string()));
    assert!(h.orchestrator.resume_pending().await.unwrap().is_none());
}

#[tokio::test]
async fn test_resume_without_swap_in_flight() {
    let mut h = harness();
    h.orchestrator.connect().await.unwrap();
    assert!(h.orchestrator.resume_pending().await.unwrap().is_none());
    assert_eq!(*h.orchestrator.status(), SwapStatus::Idle);
}
