pub mod local;
pub mod provider;
pub mod session;

pub use local::LocalWalletProvider;
pub use provider::{Connection, ProviderError, ProviderEvent, WalletProvider};
pub use session::{Session, SessionChange, WalletSession};
