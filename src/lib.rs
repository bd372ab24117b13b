pub mod balance;
pub mod chain;
pub mod config;
pub mod core;
pub mod errors;
pub mod pricing;
pub mod registry;
pub mod swap;
pub mod wallet;

// Re-export commonly used types for convenience
pub use errors::SwapAppError;
pub use registry::{Chain, ChainRegistry};
pub use swap::{SwapForm, SwapOrchestrator};
