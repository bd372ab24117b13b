use alloy::primitives::B256;
use log::debug;
use tokio::time::{sleep, Duration, Instant};

use crate::chain::chain_client::ChainClient;
use crate::chain::errors::ChainClientError;
use crate::core::base_types::TransactionReceipt;

/// Floor for the delay between polls.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

enum PollResult {
    Found(TransactionReceipt),
    NotFound,
    AllFailed,
}

/// Polls `client` for the receipt of `hash` until it shows up or `timeout` seconds pass.
///
/// Endpoint failures are not fatal while time remains; the last poll is squeezed in
/// right before the deadline.
pub async fn poll_for_receipt(
    client: &ChainClient,
    hash: B256,
    timeout: u64,
    poll_interval: f64,
) -> Result<TransactionReceipt, ChainClientError> {
    let timeout_duration = Duration::from_secs(timeout);
    let poll_duration = poll_delay(poll_interval);
    let start = Instant::now();

    loop {
        check_timeout_exceeded(start, timeout_duration, timeout)?;

        match poll_once(client, hash).await {
            PollResult::Found(receipt) => return Ok(receipt),
            PollResult::NotFound | PollResult::AllFailed => {
                let remaining = timeout_duration.saturating_sub(start.elapsed());
                if remaining > poll_duration {
                    debug!("receipt for {} not available yet, retrying in {:?}", hash, poll_duration);
                    sleep(poll_duration).await;
                } else if remaining.is_zero() {
                    return Err(timeout_error(timeout));
                } else {
                    return wait_and_final_check(client, hash, remaining, timeout).await;
                }
            }
        }
    }
}

/// Non-positive or NaN intervals fall back to the floor; oversized ones mean a single early poll.
fn poll_delay(poll_interval: f64) -> Duration {
    if poll_interval.is_nan() || poll_interval <= 0.0 {
        return MIN_POLL_INTERVAL;
    }
    Duration::try_from_secs_f64(poll_interval)
        .unwrap_or(Duration::MAX)
        .max(MIN_POLL_INTERVAL)
}

fn timeout_error(timeout: u64) -> ChainClientError {
    ChainClientError::TimeoutError(format!("Timeout waiting for receipt after {} seconds", timeout))
}

fn check_timeout_exceeded(start: Instant, timeout_duration: Duration, timeout: u64) -> Result<(), ChainClientError> {
    if start.elapsed() >= timeout_duration {
        return Err(timeout_error(timeout));
    }
    Ok(())
}

async fn poll_once(client: &ChainClient, hash: B256) -> PollResult {
    match client.get_receipt(hash).await {
        Ok(Some(receipt)) => PollResult::Found(receipt),
        Ok(None) => PollResult::NotFound,
        Err(_) => PollResult::AllFailed,
    }
}

async fn wait_and_final_check(
    client: &ChainClient,
    hash: B256,
    remaining: Duration,
    timeout: u64,
) -> Result<TransactionReceipt, ChainClientError> {
    sleep(remaining).await;
    match poll_once(client, hash).await {
        PollResult::Found(receipt) => Ok(receipt),
        PollResult::NotFound | PollResult::AllFailed => Err(timeout_error(timeout)),
    }
}
