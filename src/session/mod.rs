// Public API - what other modules can use
pub use cleanup_task::{start_cleanup_task, CleanupConfig};
pub use models::{Player, PlayerIdentity, Session, Ticket};
pub use registry::{SessionHandle, SessionRegistry};

// Internal modules
mod cleanup_task;
mod models;
mod registry;
