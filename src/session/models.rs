use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::board::{Board, BoardGenerator};
use crate::config::GameConfig;
use crate::draw::{DrawScheduler, DrawStatus, DrawStream};
use crate::shared::{AppError, ChatId, UserId};

/// Who a player is, as reported by the chat transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIdentity {
    pub id: UserId,
    pub handle: String,
    pub first_name: String,
    pub last_name: String,
}

impl PlayerIdentity {
    pub fn new(id: UserId, handle: impl Into<String>) -> Self {
        Self {
            id,
            handle: handle.into(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// A player's board for one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub session_id: String,
    pub player_id: UserId,
    pub board: Board,
    pub issued_at: DateTime<Utc>,
}

impl Ticket {
    pub fn new(session_id: String, player_id: UserId, board: Board) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            player_id,
            board,
            issued_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: UserId,
    pub handle: String,
    pub name: String,
    /// Times the player announced they are one number away
    pub wait_count: u32,
    pub ticket: Ticket,
}

/// One game's state for a single chat, from open to stop
pub struct Session {
    chat_id: ChatId,
    session_id: String,
    opened_at: DateTime<Utc>,
    stopped_at: Option<DateTime<Utc>>,
    players: HashMap<UserId, Player>,
    /// Registration order
    order: Vec<UserId>,
    scheduler: DrawScheduler,
    boards: BoardGenerator,
    min_handle_len: usize,
}

impl Session {
    pub fn new(chat_id: ChatId, config: &GameConfig) -> Result<Self, AppError> {
        config.validate()?;
        let boards = BoardGenerator::new(config.board.clone(), config.max_number)?;
        Ok(Self::with_parts(
            chat_id,
            DrawScheduler::from_config(config),
            boards,
            config.min_handle_len,
        ))
    }

    pub fn with_parts(
        chat_id: ChatId,
        scheduler: DrawScheduler,
        boards: BoardGenerator,
        min_handle_len: usize,
    ) -> Self {
        let session_id = petname::Petnames::default().generate_one(2, "-");

        Self {
            chat_id,
            session_id,
            opened_at: Utc::now(),
            stopped_at: None,
            players: HashMap::new(),
            order: Vec::new(),
            scheduler,
            boards,
            min_handle_len,
        }
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    pub fn stopped_at(&self) -> Option<DateTime<Utc>> {
        self.stopped_at
    }

    pub fn status(&self) -> DrawStatus {
        self.scheduler.status()
    }

    pub fn scheduler(&self) -> &DrawScheduler {
        &self.scheduler
    }

    pub fn player(&self, player_id: UserId) -> Result<&Player, AppError> {
        self.players.get(&player_id).ok_or(AppError::UnknownPlayer)
    }

    /// Players in the order they registered
    pub fn players(&self) -> Vec<&Player> {
        self.order
            .iter()
            .filter_map(|id| self.players.get(id))
            .collect()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Adds a player and issues their ticket; only allowed in the lobby
    pub fn register(&mut self, identity: PlayerIdentity) -> Result<&Player, AppError> {
        if self.status() != DrawStatus::Lobby {
            return Err(AppError::AlreadyStarted);
        }
        if identity.handle.trim().chars().count() < self.min_handle_len {
            return Err(AppError::MissingHandle);
        }
        if self.players.contains_key(&identity.id) {
            return Err(AppError::AlreadyRegistered);
        }

        let ticket = Ticket::new(self.session_id.clone(), identity.id, self.boards.generate());
        let player = Player {
            id: identity.id,
            name: identity.display_name(),
            handle: identity.handle,
            wait_count: 0,
            ticket,
        };

        info!(
            session_id = %self.session_id,
            player_id = player.id,
            ticket_id = %player.ticket.id,
            "Player registered"
        );
        debug!("Ticket {}:\n{}", player.ticket.id, player.ticket.board);

        self.order.push(player.id);
        Ok(self.players.entry(player.id).or_insert(player))
    }

    pub fn ensure_started(&self) -> Result<(), AppError> {
        if self.status() == DrawStatus::Lobby {
            return Err(AppError::NotStarted);
        }
        Ok(())
    }

    /// Bumps the player's wait counter and returns the new value
    pub fn mark_wait(&mut self, player_id: UserId) -> Result<u32, AppError> {
        self.ensure_started()?;
        let player = self
            .players
            .get_mut(&player_id)
            .ok_or(AppError::UnknownPlayer)?;

        player.wait_count += 1;
        debug!(player_id = player_id, wait_count = player.wait_count, "Player waiting");
        Ok(player.wait_count)
    }

    /// Applies the toggle rule to a cell of the player's ticket
    pub fn toggle_cell(
        &mut self,
        player_id: UserId,
        row: usize,
        col: usize,
    ) -> Result<bool, AppError> {
        let player = self
            .players
            .get_mut(&player_id)
            .ok_or(AppError::UnknownPlayer)?;

        player.ticket.board.toggle(row, col)
    }

    pub fn start(&mut self) -> Result<Option<DrawStream>, AppError> {
        self.scheduler.start()
    }

    pub fn pause(&mut self) -> bool {
        self.scheduler.pause()
    }

    pub async fn resume(&mut self) -> bool {
        self.scheduler.resume().await
    }

    pub fn stop(&mut self) -> bool {
        let stopped = self.scheduler.stop();
        if stopped {
            self.stopped_at = Some(Utc::now());
        }
        stopped
    }
}
