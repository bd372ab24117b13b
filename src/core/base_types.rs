//! Value types shared by every layer, re-exported from one place.

pub use super::address::{Address, AddressError};

pub use super::token::Token;

pub use super::token_amount::{TokenAmount, TokenAmountError};

pub use super::transaction_receipt::{TransactionReceipt, TransactionReceiptError};
