pub mod address;
pub mod token;
pub mod token_amount;
pub mod transaction_receipt;
pub mod wallet_manager;
pub mod base_types;  // Re-exports of the value types above
