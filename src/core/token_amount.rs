use std::fmt;

use alloy::primitives::U256;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use super::token::Token;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenAmountError {
    #[error("Invalid amount format: {0}")]
    InvalidFormat(String),

    #[error("Fractional part has {0} digits, but token only supports {1} decimals")]
    TooManyDecimals(usize, u8),

    #[error("Amount must not be negative: {0}")]
    Negative(String),

    #[error("Arithmetic overflow occurred")]
    Overflow,
}

/// Fixed-point amount in a token's smallest unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAmount {
    pub raw: u128,
    pub decimals: u8,
    pub symbol: Option<String>,
}

impl TokenAmount {
    pub fn new(raw: u128, decimals: u8, symbol: Option<String>) -> Self {
        Self { raw, decimals, symbol }
    }

    pub fn for_token(raw: u128, token: &Token) -> Self {
        Self::new(raw, token.decimals, Some(token.symbol.clone()))
    }

    /// Decimal string (e.g. `"1.5"`) → raw units.
    pub fn from_human(amount: &str, decimals: u8, symbol: Option<String>) -> Result<Self, TokenAmountError> {
        let amount = amount.trim();
        if amount.starts_with('-') {
            return Err(TokenAmountError::Negative(amount.to_string()));
        }
        let (integer_part, fractional_part) = match amount.split_once('.') {
            Some((int, frac)) => (int, frac),
            None => (amount, ""),
        };
        if integer_part.is_empty() && fractional_part.is_empty() {
            return Err(TokenAmountError::InvalidFormat(amount.to_string()));
        }
        let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if !all_digits(integer_part) || !all_digits(fractional_part) {
            return Err(TokenAmountError::InvalidFormat(amount.to_string()));
        }
        if fractional_part.len() > decimals as usize {
            return Err(TokenAmountError::TooManyDecimals(fractional_part.len(), decimals));
        }

        let integer: u128 = if integer_part.is_empty() {
            0
        } else {
            integer_part
                .parse()
                .map_err(|_| TokenAmountError::Overflow)?
        };
        let scale = 10_u128
            .checked_pow(decimals as u32)
            .ok_or(TokenAmountError::Overflow)?;
        let integer_raw = integer.checked_mul(scale).ok_or(TokenAmountError::Overflow)?;
        let fractional_raw = if fractional_part.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", fractional_part, width = decimals as usize);
            padded.parse::<u128>().map_err(|_| TokenAmountError::Overflow)?
        };
        let raw = integer_raw
            .checked_add(fractional_raw)
            .ok_or(TokenAmountError::Overflow)?;
        Ok(Self { raw, decimals, symbol })
    }

    /// Converts an exact decimal, truncating toward zero past `decimals` places.
    pub fn from_decimal(value: Decimal, decimals: u8, symbol: Option<String>) -> Result<Self, TokenAmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(TokenAmountError::Negative(value.to_string()));
        }
        let truncated = value
            .round_dp_with_strategy(decimals as u32, RoundingStrategy::ToZero)
            .normalize();
        Self::from_human(&truncated.to_string(), decimals, symbol)
    }

    /// Raw → decimal string (no floats).
    pub fn human(&self) -> String {
        let divisor = 10_u128.pow(self.decimals as u32);
        let integer_part = self.raw / divisor;
        let fractional_part = self.raw % divisor;
        if fractional_part == 0 {
            return integer_part.to_string();
        }
        let fractional_str = format!("{:0>width$}", fractional_part, width = self.decimals as usize);
        format!("{}.{}", integer_part, fractional_str.trim_end_matches('0'))
    }

    pub fn to_u256(&self) -> U256 {
        U256::from(self.raw)
    }

    pub fn is_zero(&self) -> bool {
        self.raw == 0
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.symbol {
            Some(symbol) => write!(f, "{} {}", self.human(), symbol),
            None => write!(f, "{}", self.human()),
        }
    }
}
