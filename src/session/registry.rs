use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use super::models::Session;
use crate::config::GameConfig;
use crate::shared::{AppError, ChatId};

/// Shared handle to a live session
pub type SessionHandle = Arc<Mutex<Session>>;

/// Process-wide map from chat to its single live session
pub struct SessionRegistry {
    config: GameConfig,
    sessions: RwLock<HashMap<ChatId, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new(config: GameConfig) -> Result<Self, AppError> {
        config.validate()?;
        Ok(Self {
            config,
            sessions: RwLock::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Creates a session in the lobby; fails if the chat already has one
    #[instrument(skip(self))]
    pub async fn open(&self, chat_id: ChatId) -> Result<SessionHandle, AppError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&chat_id) {
            warn!(chat_id = chat_id, "Session already open");
            return Err(AppError::AlreadyOpen);
        }

        let session = Session::new(chat_id, &self.config)?;
        info!(
            chat_id = chat_id,
            session_id = %session.session_id(),
            "Session opened"
        );

        let handle = Arc::new(Mutex::new(session));
        sessions.insert(chat_id, handle.clone());
        Ok(handle)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, chat_id: ChatId) -> Result<SessionHandle, AppError> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(&chat_id).cloned();

        match &session {
            Some(_) => debug!(chat_id = chat_id, "Session found"),
            None => debug!(chat_id = chat_id, "Session not found"),
        }

        session.ok_or(AppError::NoSession)
    }

    /// Removes the chat's session and hands it back to the caller
    #[instrument(skip(self))]
    pub async fn close(&self, chat_id: ChatId) -> Result<SessionHandle, AppError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.remove(&chat_id).ok_or(AppError::NoSession)?;

        info!(chat_id = chat_id, "Session closed");
        Ok(session)
    }

    /// Removes the chat's session only if it is still `expected`; a session
    /// reopened in the meantime is left alone
    pub async fn close_if(&self, chat_id: ChatId, expected: &SessionHandle) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get(&chat_id) {
            Some(current) if Arc::ptr_eq(current, expected) => {
                sessions.remove(&chat_id);
                info!(chat_id = chat_id, "Session closed");
                true
            }
            Some(_) => {
                debug!(chat_id = chat_id, "Session was replaced, keeping it");
                false
            }
            None => false,
        }
    }

    pub async fn chat_ids(&self) -> Vec<ChatId> {
        let sessions = self.sessions.read().await;
        sessions.keys().copied().collect()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
