pub mod orchestrator;
pub mod session;

pub use orchestrator::{LaunchFailure, LaunchOrchestrator, RuntimeResolution};
pub use session::{format_uptime, LaunchSession, SessionStatus};
