use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Chat identity supplied by the transport layer
pub type ChatId = i64;

/// Player identity supplied by the transport layer
pub type UserId = i64;

/// Opaque handle returned by the messaging sink for a rendered message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("No game is open in this chat")]
    NoSession,

    #[error("A game is already open in this chat")]
    AlreadyOpen,

    #[error("The game has already started")]
    AlreadyStarted,

    #[error("Player is already registered")]
    AlreadyRegistered,

    #[error("Player handle is missing or too short")]
    MissingHandle,

    #[error("The game has not started yet")]
    NotStarted,

    #[error("Player is not registered in this game")]
    UnknownPlayer,

    #[error("Cell ({row}, {col}) is outside the board")]
    OutOfBounds { row: usize, col: usize },

    #[error("Number pool is empty")]
    EmptyPool,

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Messaging sink error: {0}")]
    Sink(String),
}
