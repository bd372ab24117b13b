pub mod chain_client;
pub mod contracts;
pub mod errors;
pub mod parsers;
pub mod receipt_polling;
pub mod url_wrapper;

pub use chain_client::ChainClient;
pub use errors::{ChainClientCreationError, ChainClientError};
pub use url_wrapper::{RpcUrl, SafeUrl, SafeUrlError};
