// Library crate for the chat lotto game
// This file exposes the public API for integration tests

pub mod board;
pub mod config;
pub mod draw;
pub mod game;
pub mod session;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use config::{BoardConfig, GameConfig};
pub use draw::{DrawScheduler, DrawStatus};
pub use game::{GameService, MessageSink, Notice, Outcome, RenderDirective, TracingSink};
pub use session::{PlayerIdentity, SessionRegistry};
pub use shared::{AppError, ChatId, MessageId, UserId};
