use std::str::FromStr;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Bytes, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::chain::contracts::ICrossChainRouter;
use crate::core::base_types::{Address, AddressError, TokenAmount, TokenAmountError};

/// Seconds the router accepts a swap after it was built.
pub const DEADLINE_WINDOW_SECS: u64 = 3600;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please connect your wallet first")]
    NotConnected,

    #[error("Amount is required")]
    MissingAmount,

    #[error("Amount is not a valid decimal number: {0}")]
    UnparsableAmount(String),

    #[error("Amount must be greater than zero, got {0}")]
    NonPositiveAmount(String),

    #[error("From token is required")]
    MissingFromToken,

    #[error("To token is required")]
    MissingToToken,

    #[error("Invalid token address {0}: {1}")]
    InvalidAddress(String, AddressError),

    #[error("Token {token} is not tradable on chain {chain_id}")]
    TokenNotOnChain { token: Address, chain_id: u64 },

    #[error("Minimum output is not a valid amount: {0}")]
    InvalidMinOut(String),

    #[error("Amount does not fit {symbol}: {source}")]
    Amount { symbol: String, source: TokenAmountError },

    #[error("A swap is already pending")]
    SwapPending,
}

/// Raw user input for one swap, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwapForm {
    pub from_token: String,
    pub to_token: String,
    pub amount_in: String,
    /// Left empty, the quote's minimum output is used.
    pub amount_out_min: Option<String>,
}

impl SwapForm {
    pub fn new(from_token: &str, to_token: &str, amount_in: &str) -> Self {
        Self {
            from_token: from_token.to_string(),
            to_token: to_token.to_string(),
            amount_in: amount_in.to_string(),
            amount_out_min: None,
        }
    }

    pub fn with_min_out(mut self, amount_out_min: &str) -> Self {
        self.amount_out_min = Some(amount_out_min.to_string());
        self
    }
}

/// A form that passed validation, with parsed fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSwap {
    pub account: Address,
    pub from_token: Address,
    pub to_token: Address,
    pub amount_in: Decimal,
    pub amount_out_min: Option<Decimal>,
}

/// Parses a strictly positive decimal amount.
pub fn parse_positive_amount(input: &str) -> Result<Decimal, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingAmount);
    }
    let amount = Decimal::from_str(trimmed).map_err(|_| ValidationError::UnparsableAmount(trimmed.to_string()))?;
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount(trimmed.to_string()));
    }
    Ok(amount)
}

pub(crate) fn parse_token_field(input: &str, missing: ValidationError) -> Result<Address, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(missing);
    }
    Address::from_string(trimmed).map_err(|e| ValidationError::InvalidAddress(trimmed.to_string(), e))
}

/// Parameters of one `swapCrossChain` call, built per attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRequest {
    pub from_token: Address,
    pub to_token: Address,
    pub amount_in: TokenAmount,
    pub amount_out_min: TokenAmount,
    pub dst_chain_id: u64,
    /// Unix seconds
    pub deadline: u64,
    /// Relay fee sent as the call's value, in the source chain's native asset
    pub fee_value: TokenAmount,
}

impl SwapRequest {
    pub fn call(&self) -> ICrossChainRouter::swapCrossChainCall {
        ICrossChainRouter::swapCrossChainCall {
            tokenIn: self.from_token.alloy_address(),
            tokenOut: self.to_token.alloy_address(),
            amountIn: self.amount_in.to_u256(),
            amountOutMin: self.amount_out_min.to_u256(),
            dstChainId: U256::from(self.dst_chain_id),
            deadline: U256::from(self.deadline),
        }
    }

    pub fn calldata(&self) -> Bytes {
        Bytes::from(self.call().abi_encode())
    }

    /// Payable call to `router` carrying the relay fee.
    pub fn to_transaction(&self, router: &Address) -> TransactionRequest {
        TransactionRequest::default()
            .with_to(router.alloy_address())
            .with_input(self.calldata())
            .with_value(self.fee_value.to_u256())
    }
}
