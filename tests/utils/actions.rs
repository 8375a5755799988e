#![allow(dead_code)] // Test utilities may not all be used in every test

use tokio::time::{sleep, timeout, Duration};

use lotto::{AppError, Notice, Outcome, UserId};

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    pub fn player_id(&self, handle: &str) -> UserId {
        self.players
            .iter()
            .find(|p| p.handle == handle)
            .map(|p| p.id)
            .unwrap()
    }

    pub async fn start(&self) -> Result<Outcome, AppError> {
        self.service.start(self.chat_id).await
    }

    pub async fn pause(&self) -> Result<Outcome, AppError> {
        self.service.pause(self.chat_id).await
    }

    pub async fn resume(&self) -> Result<Outcome, AppError> {
        self.service.resume(self.chat_id).await
    }

    pub async fn stop(&self) -> Result<Outcome, AppError> {
        self.service.stop(self.chat_id).await
    }

    pub async fn draw_log(&self) -> Vec<u32> {
        self.service.snapshot(self.chat_id).await.unwrap().draw_log
    }

    // ============================================================================
    // Waiting Helpers
    // ============================================================================

    /// Wait until the sink has seen a notice matching `wanted`
    pub async fn wait_for_notice(&self, wanted: impl Fn(&Notice) -> bool) {
        timeout(Duration::from_secs(10), async {
            while !self.mock_sink.get_notices().await.iter().any(&wanted) {
                sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .expect("expected notice was never rendered");
    }

    /// Wait until at least `count` numbers are in the draw log
    pub async fn wait_for_draws(&self, count: usize) {
        timeout(Duration::from_secs(10), async {
            while self.draw_log().await.len() < count {
                sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .expect("draw log did not grow in time");
    }

    pub async fn wait_until_exhausted(&self) {
        self.wait_for_notice(|n| *n == Notice::AllNumbersDrawn).await;
    }
}
