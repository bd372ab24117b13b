use thiserror::Error;

use crate::balance::BalanceFetchError;
use crate::registry::RegistryError;
use crate::swap::gateway::GatewayError;
use crate::swap::request::ValidationError;
use crate::wallet::provider::ProviderError;

/// Every failure the session and orchestrator surface to the user.
///
/// None of these is fatal and none is retried automatically.
#[derive(Error, Debug, Clone)]
pub enum SwapAppError {
    #[error("Failed to connect wallet: {0}")]
    Connection(ProviderError),

    #[error("Unsupported chain: {0}")]
    UnsupportedChain(u64),

    #[error("Invalid swap input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to fetch balances: {0}")]
    BalanceFetch(#[from] BalanceFetchError),

    #[error("Failed to switch chain: {0}")]
    ChainSwitch(String),

    #[error("Failed to execute swap: {0}")]
    SwapExecution(#[from] GatewayError),

    #[error("Chain table error: {0}")]
    Registry(RegistryError),
}

impl From<RegistryError> for SwapAppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnsupportedChain(chain_id) => SwapAppError::UnsupportedChain(chain_id),
            other => SwapAppError::Registry(other),
        }
    }
}

impl SwapAppError {
    /// Short heading for the notification shown to the user.
    pub fn title(&self) -> &'static str {
        match self {
            SwapAppError::Connection(_) => "Connection failed",
            SwapAppError::UnsupportedChain(_) => "Unsupported network",
            SwapAppError::Validation(_) => "Invalid input",
            SwapAppError::BalanceFetch(_) => "Balance refresh failed",
            SwapAppError::ChainSwitch(_) => "Network switch failed",
            SwapAppError::SwapExecution(_) => "Swap failed",
            SwapAppError::Registry(_) => "Configuration error",
        }
    }
}
