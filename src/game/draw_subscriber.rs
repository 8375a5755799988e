use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::render::{MessageSink, Notice, RenderDirective};
use crate::draw::{Draw, DrawLog, DrawStream};
use crate::shared::ChatId;

/// Consumes a session's draw stream: records each number and announces it
pub struct DrawSubscription {
    chat_id: ChatId,
    session_id: String,
    stream: DrawStream,
    draw_log: Arc<DrawLog>,
    sink: Arc<dyn MessageSink>,
}

impl DrawSubscription {
    pub fn new(
        chat_id: ChatId,
        session_id: String,
        stream: DrawStream,
        draw_log: Arc<DrawLog>,
        sink: Arc<dyn MessageSink>,
    ) -> Self {
        Self {
            chat_id,
            session_id,
            stream,
            draw_log,
            sink,
        }
    }

    /// Spawns the consumer task; it ends when the scheduler is stopped
    pub fn start(mut self) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                chat_id = self.chat_id,
                session_id = %self.session_id,
                "Draw subscription started"
            );

            while let Some(draw) = self.stream.next().await {
                let notice = match draw {
                    Draw::Number(number) => {
                        self.draw_log.record(number);
                        Notice::NumberDrawn {
                            number,
                            draw_count: self.draw_log.len(),
                        }
                    }
                    Draw::Exhausted => Notice::AllNumbersDrawn,
                };

                if let Err(e) = self.sink.render(self.directive(notice)).await {
                    warn!(
                        chat_id = self.chat_id,
                        session_id = %self.session_id,
                        error = %e,
                        "Failed to announce draw"
                    );
                }
            }

            info!(
                chat_id = self.chat_id,
                session_id = %self.session_id,
                drawn = self.draw_log.len(),
                "Draw subscription ended - stream closed"
            );
        })
    }

    fn directive(&self, notice: Notice) -> RenderDirective {
        RenderDirective {
            chat_id: self.chat_id,
            session_id: self.session_id.clone(),
            notice,
            snapshot: None,
            tickets: Vec::new(),
        }
    }
}
