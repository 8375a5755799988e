use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::draw_subscriber::DrawSubscription;
use super::render::{MessageSink, Notice, Outcome, RenderDirective, SessionSnapshot};
use crate::draw::DrawStatus;
use crate::session::{PlayerIdentity, Session, SessionRegistry};
use crate::shared::{AppError, ChatId, UserId};

/// Caller-facing game operations, keyed by chat.
///
/// Every operation returns what the messaging layer should redraw. Draw
/// announcements are pushed to the sink by the session's draw subscription.
pub struct GameService {
    registry: Arc<SessionRegistry>,
    sink: Arc<dyn MessageSink>,
}

impl GameService {
    pub fn new(registry: Arc<SessionRegistry>, sink: Arc<dyn MessageSink>) -> Self {
        Self { registry, sink }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Open a new lobby in the chat
    #[instrument(skip(self))]
    pub async fn open_session(&self, chat_id: ChatId) -> Result<RenderDirective, AppError> {
        let handle = self.registry.open(chat_id).await?;
        let session = handle.lock().await;
        Ok(RenderDirective::for_session(&session, Notice::SessionOpened))
    }

    /// Register a player and issue their ticket
    #[instrument(skip(self))]
    pub async fn register(
        &self,
        chat_id: ChatId,
        identity: PlayerIdentity,
    ) -> Result<RenderDirective, AppError> {
        let handle = self.registry.get(chat_id).await?;
        let mut session = handle.lock().await;

        let player_id = session.register(identity)?.id;
        let player = session.player(player_id)?;

        Ok(
            RenderDirective::for_session(&session, Notice::PlayerRegistered { player_id })
                .with_ticket(player),
        )
    }

    /// Leave the lobby and begin drawing
    #[instrument(skip(self))]
    pub async fn start(&self, chat_id: ChatId) -> Result<Outcome, AppError> {
        let handle = self.registry.get(chat_id).await?;
        let mut session = handle.lock().await;

        let Some(stream) = session.start()? else {
            return Ok(unchanged(&session));
        };

        DrawSubscription::new(
            chat_id,
            session.session_id().to_string(),
            stream,
            session.scheduler().draw_log(),
            self.sink.clone(),
        )
        .start();

        info!(
            chat_id = chat_id,
            session_id = %session.session_id(),
            players = session.player_count(),
            "Game started"
        );
        Ok(Outcome::Applied(RenderDirective::for_session(
            &session,
            Notice::GameStarted,
        )))
    }

    #[instrument(skip(self))]
    pub async fn pause(&self, chat_id: ChatId) -> Result<Outcome, AppError> {
        let handle = self.registry.get(chat_id).await?;
        let mut session = handle.lock().await;

        if !session.pause() {
            return Ok(unchanged(&session));
        }

        info!(chat_id = chat_id, "Game paused");
        Ok(Outcome::Applied(RenderDirective::for_session(
            &session,
            Notice::GamePaused,
        )))
    }

    #[instrument(skip(self))]
    pub async fn resume(&self, chat_id: ChatId) -> Result<Outcome, AppError> {
        let handle = self.registry.get(chat_id).await?;
        let mut session = handle.lock().await;

        if !session.resume().await {
            return Ok(unchanged(&session));
        }

        info!(chat_id = chat_id, "Game resumed");
        Ok(Outcome::Applied(RenderDirective::for_session(
            &session,
            Notice::GameResumed,
        )))
    }

    /// Stop drawing for good and reveal every ticket
    #[instrument(skip(self))]
    pub async fn stop(&self, chat_id: ChatId) -> Result<Outcome, AppError> {
        let handle = self.registry.get(chat_id).await?;
        let mut session = handle.lock().await;

        Ok(finish(&mut session))
    }

    /// Player signals they are one number away
    #[instrument(skip(self))]
    pub async fn mark_wait(
        &self,
        chat_id: ChatId,
        player_id: UserId,
    ) -> Result<RenderDirective, AppError> {
        let handle = self.registry.get(chat_id).await?;
        let mut session = handle.lock().await;

        let wait_count = session.mark_wait(player_id)?;

        Ok(RenderDirective::for_session(
            &session,
            Notice::PlayerWaiting {
                player_id,
                wait_count,
            },
        ))
    }

    /// Player claims a win: drawing pauses and their ticket is shown with every draw so far
    #[instrument(skip(self))]
    pub async fn declare_bingo(
        &self,
        chat_id: ChatId,
        player_id: UserId,
    ) -> Result<RenderDirective, AppError> {
        let handle = self.registry.get(chat_id).await?;
        let mut session = handle.lock().await;

        session.ensure_started()?;
        session.player(player_id)?;
        session.pause();

        info!(
            chat_id = chat_id,
            player_id = player_id,
            drawn = session.scheduler().draw_log().len(),
            "Bingo declared"
        );

        let player = session.player(player_id)?;
        Ok(RenderDirective::for_session(&session, Notice::Bingo { player_id }).with_ticket(player))
    }

    /// Flip a blank cell of the player's ticket between blank and checked
    #[instrument(skip(self))]
    pub async fn toggle_cell(
        &self,
        chat_id: ChatId,
        player_id: UserId,
        row: usize,
        col: usize,
    ) -> Result<Outcome, AppError> {
        let handle = self.registry.get(chat_id).await?;
        let mut session = handle.lock().await;

        if !session.toggle_cell(player_id, row, col)? {
            debug!(player_id = player_id, row = row, col = col, "Number cell left unchanged");
            return Ok(unchanged(&session));
        }

        let player = session.player(player_id)?;
        Ok(Outcome::Applied(
            RenderDirective::for_session(&session, Notice::TicketUpdated { player_id, row, col })
                .with_ticket(player),
        ))
    }

    /// Current state of the chat's session
    pub async fn snapshot(&self, chat_id: ChatId) -> Result<SessionSnapshot, AppError> {
        let handle = self.registry.get(chat_id).await?;
        let session = handle.lock().await;
        Ok(SessionSnapshot::capture(&session))
    }

    /// Acknowledge teardown: stops the game if still running and frees the chat
    #[instrument(skip(self))]
    pub async fn close_session(&self, chat_id: ChatId) -> Result<Outcome, AppError> {
        let handle = self.registry.close(chat_id).await?;
        let mut session = handle.lock().await;

        Ok(finish(&mut session))
    }
}

fn finish(session: &mut Session) -> Outcome {
    if !session.stop() {
        return unchanged(session);
    }

    info!(
        chat_id = session.chat_id(),
        session_id = %session.session_id(),
        drawn = session.scheduler().draw_log().len(),
        "Game finished"
    );

    let mut directive = RenderDirective::for_session(session, Notice::GameFinished);
    for player in session.players() {
        directive = directive.with_ticket(player);
    }
    Outcome::Applied(directive)
}

fn unchanged(session: &Session) -> Outcome {
    let status: DrawStatus = session.status();
    debug!(chat_id = session.chat_id(), status = %status, "Request left state unchanged");
    Outcome::Unchanged { status }
}
