use async_trait::async_trait;
use serde::Serialize;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::info;
use uuid::Uuid;

use crate::board::Cell;
use crate::draw::DrawStatus;
use crate::session::{Player, Session};
use crate::shared::{AppError, ChatId, MessageId, UserId};

/// What happened, so the messaging layer can pick a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    SessionOpened,
    PlayerRegistered { player_id: UserId },
    GameStarted,
    GamePaused,
    GameResumed,
    GameFinished,
    PlayerWaiting { player_id: UserId, wait_count: u32 },
    Bingo { player_id: UserId },
    TicketUpdated { player_id: UserId, row: usize, col: usize },
    NumberDrawn { number: u32, draw_count: usize },
    AllNumbersDrawn,
}

/// One roster line: position, handle, ticket and wait count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub position: usize,
    pub player_id: UserId,
    pub handle: String,
    pub name: String,
    pub ticket_id: Uuid,
    pub wait_count: u32,
}

/// Everything needed to redraw the session's main message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub chat_id: ChatId,
    pub session_id: String,
    pub status: DrawStatus,
    pub roster: Vec<RosterEntry>,
    pub draw_log: Vec<u32>,
}

impl SessionSnapshot {
    /// Reads the draw log through its lock; never the live vector
    pub fn capture(session: &Session) -> Self {
        let roster = session
            .players()
            .into_iter()
            .enumerate()
            .map(|(i, player)| RosterEntry {
                position: i + 1,
                player_id: player.id,
                handle: player.handle.clone(),
                name: player.name.clone(),
                ticket_id: player.ticket.id,
                wait_count: player.wait_count,
            })
            .collect();

        Self {
            chat_id: session.chat_id(),
            session_id: session.session_id().to_string(),
            status: session.status(),
            roster,
            draw_log: session.scheduler().draw_log().snapshot(),
        }
    }
}

/// A player's board as shown to them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketView {
    pub ticket_id: Uuid,
    pub session_id: String,
    pub player_id: UserId,
    pub handle: String,
    pub grid: Vec<Vec<Cell>>,
}

impl From<&Player> for TicketView {
    fn from(player: &Player) -> Self {
        Self {
            ticket_id: player.ticket.id,
            session_id: player.ticket.session_id.clone(),
            player_id: player.id,
            handle: player.handle.clone(),
            grid: player.ticket.board.grid().to_vec(),
        }
    }
}

/// State change handed to the messaging layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderDirective {
    pub chat_id: ChatId,
    pub session_id: String,
    pub notice: Notice,
    /// Absent on per-draw notices, which are sent without touching the session
    pub snapshot: Option<SessionSnapshot>,
    pub tickets: Vec<TicketView>,
}

impl RenderDirective {
    pub fn for_session(session: &Session, notice: Notice) -> Self {
        Self {
            chat_id: session.chat_id(),
            session_id: session.session_id().to_string(),
            notice,
            snapshot: Some(SessionSnapshot::capture(session)),
            tickets: Vec::new(),
        }
    }

    pub fn with_ticket(mut self, player: &Player) -> Self {
        self.tickets.push(TicketView::from(player));
        self
    }

    pub fn status(&self) -> Option<DrawStatus> {
        self.snapshot.as_ref().map(|s| s.status)
    }
}

/// Result of a call that may be a redundant no-op
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied(RenderDirective),
    /// Nothing changed; carries the current status
    Unchanged { status: DrawStatus },
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    pub fn directive(&self) -> Option<&RenderDirective> {
        match self {
            Outcome::Applied(directive) => Some(directive),
            Outcome::Unchanged { .. } => None,
        }
    }
}

/// Outbound messaging layer: formats and transmits a directive
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn render(&self, directive: RenderDirective) -> Result<MessageId, AppError>;
}

/// Sink that only logs directives; used by the binary when no transport is wired up
#[derive(Debug, Default)]
pub struct TracingSink {
    next_id: AtomicI64,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageSink for TracingSink {
    async fn render(&self, directive: RenderDirective) -> Result<MessageId, AppError> {
        let id = MessageId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let payload =
            serde_json::to_string(&directive.notice).map_err(|e| AppError::Sink(e.to_string()))?;

        info!(
            chat_id = directive.chat_id,
            session_id = %directive.session_id,
            message_id = %id,
            notice = %payload,
            status = ?directive.status(),
            "Render"
        );
        Ok(id)
    }
}
