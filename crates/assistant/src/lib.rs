pub mod backboard;
pub mod traits;
pub mod util;

// Re-exports for convenience.
pub use backboard::BackboardClient;
pub use traits::{AssistantService, MessageRequest, RunResult, RunStatus};
