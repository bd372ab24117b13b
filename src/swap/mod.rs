pub mod gateway;
pub mod notification;
pub mod orchestrator;
pub mod request;

pub use gateway::{GatewayError, PendingSwap, RouterGateway, RpcGateway, SwapReceipt};
pub use notification::{Notification, NotificationLevel};
pub use orchestrator::{OrchestratorConfig, SwapOrchestrator, SwapOutcome, SwapStatus};
pub use request::{SwapForm, SwapRequest, ValidatedSwap, ValidationError, DEADLINE_WINDOW_SECS};
