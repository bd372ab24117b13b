use thiserror::Error;

use super::token_amount::TokenAmount;

/// Inclusion record of a source-chain transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub tx_hash: String,
    pub block_number: u64,
    pub status: bool,
    pub gas_used: u64,
    pub effective_gas_price: u128,
}

impl TransactionReceipt {
    /// Gas paid for the transaction, in the chain's native asset (18 decimals).
    pub fn tx_fee(&self, native_symbol: &str) -> TokenAmount {
        let fee_raw = (self.gas_used as u128).saturating_mul(self.effective_gas_price);
        TokenAmount::new(fee_raw, 18, Some(native_symbol.to_string()))
    }

    /// Builds a receipt from JSON-RPC receipt JSON. Numeric fields may be hex or number.
    pub fn from_web3(receipt: serde_json::Value) -> Result<Self, TransactionReceiptError> {
        let obj = receipt
            .as_object()
            .ok_or_else(|| TransactionReceiptError::InvalidFormat("Receipt must be a JSON object".to_string()))?;

        let tx_hash = obj
            .get("transactionHash")
            .and_then(|v| v.as_str())
            .ok_or_else(|| TransactionReceiptError::MissingField("transactionHash".to_string()))?
            .to_string();

        let field = |name: &str| {
            obj.get(name)
                .ok_or_else(|| TransactionReceiptError::MissingField(name.to_string()))
        };

        let block_number = parse_hex_or_number(field("blockNumber")?)? as u64;
        let status = match field("status")? {
            serde_json::Value::String(s) => match s.as_str() {
                "0x1" | "0x01" => true,
                "0x0" | "0x00" => false,
                other => {
                    return Err(TransactionReceiptError::InvalidFormat(format!(
                        "Invalid status value: {}",
                        other
                    )))
                }
            },
            serde_json::Value::Bool(b) => *b,
            serde_json::Value::Number(n) => n.as_u64() == Some(1),
            _ => {
                return Err(TransactionReceiptError::InvalidFormat(
                    "status must be a hex string or number".to_string(),
                ))
            }
        };
        let gas_used = parse_hex_or_number(field("gasUsed")?)? as u64;
        let effective_gas_price = match obj.get("effectiveGasPrice") {
            Some(v) => parse_hex_or_number(v)?,
            None => 0,
        };

        Ok(TransactionReceipt {
            tx_hash,
            block_number,
            status,
            gas_used,
            effective_gas_price,
        })
    }
}

fn parse_hex_or_number(value: &serde_json::Value) -> Result<u128, TransactionReceiptError> {
    match value {
        serde_json::Value::String(s) => {
            let hex_str = s
                .strip_prefix("0x")
                .or_else(|| s.strip_prefix("0X"))
                .unwrap_or(s);
            u128::from_str_radix(hex_str, 16)
                .map_err(|e| TransactionReceiptError::InvalidFormat(format!("Invalid hex string '{}': {}", s, e)))
        }
        serde_json::Value::Number(n) => n
            .as_u64()
            .map(u128::from)
            .ok_or_else(|| TransactionReceiptError::InvalidFormat(format!("Number too large or negative: {}", n))),
        _ => Err(TransactionReceiptError::InvalidFormat(
            "Value must be a hex string or number".to_string(),
        )),
    }
}

#[derive(Error, Debug)]
pub enum TransactionReceiptError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}
