use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use lotto::{AppError, MessageId, MessageSink, Notice, RenderDirective};

// ============================================================================
// Mock Infrastructure
// ============================================================================

#[derive(Clone)]
pub struct MockMessageSink {
    rendered: Arc<RwLock<Vec<RenderDirective>>>,
    next_id: Arc<AtomicI64>,
    failing: Arc<AtomicBool>,
}

impl MockMessageSink {
    pub fn new() -> Self {
        Self {
            rendered: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(AtomicI64::new(1)),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make every following render fail, as a broken transport would
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn get_directives(&self) -> Vec<RenderDirective> {
        self.rendered.read().await.clone()
    }

    pub async fn get_notices(&self) -> Vec<Notice> {
        self.rendered
            .read()
            .await
            .iter()
            .map(|d| d.notice.clone())
            .collect()
    }

    pub async fn clear_directives(&self) {
        self.rendered.write().await.clear();
    }
}

#[async_trait]
impl MessageSink for MockMessageSink {
    async fn render(&self, directive: RenderDirective) -> Result<MessageId, AppError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Sink("transport unavailable".to_string()));
        }

        self.rendered.write().await.push(directive);
        Ok(MessageId(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }
}
