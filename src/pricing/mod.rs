pub mod quote;

pub use quote::{PlaceholderQuote, Quote, QuoteEstimator, QuoteStrategy};
pub use rust_decimal::Decimal;
