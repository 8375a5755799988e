use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use strum_macros::{Display, EnumIter};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::log::DrawLog;
use super::pool::NumberPool;
use super::worker::run_draws;
use crate::config::GameConfig;
use crate::shared::AppError;

/// Lifecycle of a draw run. STARTED and PAUSED may alternate; STOPPED is terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DrawStatus {
    Lobby,
    Started,
    Paused,
    Stopped,
}

/// Item published by the draw task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Draw {
    Number(u32),
    /// Every number has been drawn; no more items will follow from this run
    Exhausted,
}

/// Receiving end of the draw channel, handed out once by `DrawScheduler::start`
pub struct DrawStream {
    receiver: mpsc::Receiver<Draw>,
}

impl DrawStream {
    /// Next draw, or `None` once the scheduler is stopped and the channel drained
    pub async fn next(&mut self) -> Option<Draw> {
        self.receiver.recv().await
    }

    /// Non-blocking variant of `next`
    pub fn try_next(&mut self) -> Option<Draw> {
        self.receiver.try_recv().ok()
    }
}

struct DrawWorker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Timed draw scheduler owning the number pool, the draw log and at most one
/// background draw task.
///
/// `pause` and `stop` never wait: they cancel the running task and detach it.
/// `resume` waits (bounded by the handoff timeout) for the detached task to
/// finish before spawning its replacement, so two draw tasks never overlap.
pub struct DrawScheduler {
    interval: Duration,
    max_number: u32,
    handoff_timeout: Duration,
    status: DrawStatus,
    pool: Arc<NumberPool>,
    draw_log: Arc<DrawLog>,
    /// Set once the end marker has reached the channel
    exhausted: Arc<AtomicBool>,
    sender: Option<mpsc::Sender<Draw>>,
    worker: Option<DrawWorker>,
    retired: Option<JoinHandle<()>>,
}

impl DrawScheduler {
    pub fn new(interval: Duration, max_number: u32, handoff_timeout: Duration) -> Self {
        Self {
            interval,
            max_number,
            handoff_timeout,
            status: DrawStatus::Lobby,
            pool: Arc::new(NumberPool::new()),
            draw_log: Arc::new(DrawLog::new()),
            exhausted: Arc::new(AtomicBool::new(false)),
            sender: None,
            worker: None,
            retired: None,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(
            config.draw_interval(),
            config.max_number,
            config.handoff_timeout(),
        )
    }

    /// Replaces the pool (e.g. one with a seeded generator)
    pub fn with_pool(mut self, pool: NumberPool) -> Self {
        self.pool = Arc::new(pool);
        self
    }

    pub fn status(&self) -> DrawStatus {
        self.status
    }

    pub fn max_number(&self) -> u32 {
        self.max_number
    }

    /// Numbers not drawn yet
    pub fn remaining(&self) -> usize {
        self.pool.remaining()
    }

    pub fn draw_log(&self) -> Arc<DrawLog> {
        self.draw_log.clone()
    }

    /// Appends a received draw to the log; called by the stream consumer
    pub fn record_draw(&self, number: u32) {
        self.draw_log.record(number);
    }

    /// LOBBY → STARTED. Refills the pool and launches the draw task.
    /// Returns `None` if the scheduler has already left the lobby.
    pub fn start(&mut self) -> Result<Option<DrawStream>, AppError> {
        if self.status != DrawStatus::Lobby {
            debug!(status = %self.status, "Start ignored");
            return Ok(None);
        }

        self.pool.reset(self.max_number)?;
        self.exhausted.store(false, Ordering::SeqCst);

        let (sender, receiver) = mpsc::channel(1);
        self.sender = Some(sender);
        self.spawn_worker();
        self.status = DrawStatus::Started;

        info!(max_number = self.max_number, "Draw scheduler started");
        Ok(Some(DrawStream { receiver }))
    }

    /// STARTED → PAUSED. Signals the draw task and returns without waiting for it.
    pub fn pause(&mut self) -> bool {
        if self.status != DrawStatus::Started {
            debug!(status = %self.status, "Pause ignored");
            return false;
        }

        self.retire_worker();
        self.status = DrawStatus::Paused;

        info!(remaining = self.remaining(), "Draw scheduler paused");
        true
    }

    /// PAUSED → STARTED. Continues drawing from the numbers still in the pool.
    pub async fn resume(&mut self) -> bool {
        if self.status != DrawStatus::Paused {
            debug!(status = %self.status, "Resume ignored");
            return false;
        }

        self.settle().await;
        self.spawn_worker();
        self.status = DrawStatus::Started;

        info!(remaining = self.remaining(), "Draw scheduler resumed");
        true
    }

    /// Any state → STOPPED. Signals the draw task and closes the stream once it exits.
    pub fn stop(&mut self) -> bool {
        if self.status == DrawStatus::Stopped {
            debug!("Stop ignored");
            return false;
        }

        self.retire_worker();
        self.sender = None;
        self.status = DrawStatus::Stopped;

        info!(drawn = self.draw_log.len(), "Draw scheduler stopped");
        true
    }

    /// Waits for a cancelled draw task to exit, aborting it after the handoff timeout
    pub async fn settle(&mut self) {
        let Some(mut handle) = self.retired.take() else {
            return;
        };

        if tokio::time::timeout(self.handoff_timeout, &mut handle)
            .await
            .is_err()
        {
            warn!(
                timeout_ms = self.handoff_timeout.as_millis() as u64,
                "Draw task did not exit in time, aborting"
            );
            handle.abort();
        }
    }

    fn spawn_worker(&mut self) {
        let Some(sender) = self.sender.clone() else {
            return;
        };

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_draws(
            self.pool.clone(),
            sender,
            cancel.clone(),
            self.interval,
            self.exhausted.clone(),
        ));
        self.worker = Some(DrawWorker { cancel, handle });
    }

    fn retire_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.cancel.cancel();
            // a previously retired task was cancelled too and exits on its own
            self.retired = Some(worker.handle);
        }
    }
}

impl Drop for DrawScheduler {
    fn drop(&mut self) {
        if let Some(worker) = &self.worker {
            worker.cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;

    const WAIT: Duration = Duration::from_secs(5);

    fn scheduler(max_number: u32, interval_ms: u64) -> DrawScheduler {
        DrawScheduler::new(
            Duration::from_millis(interval_ms),
            max_number,
            Duration::from_millis(500),
        )
        .with_pool(NumberPool::with_rng(StdRng::seed_from_u64(9)))
    }

    async fn next_draw(stream: &mut DrawStream) -> Option<Draw> {
        tokio::time::timeout(WAIT, stream.next())
            .await
            .expect("draw stream stalled")
    }

    /// Receives and records draws until the exhaustion marker
    async fn drain_to_end(scheduler: &DrawScheduler, stream: &mut DrawStream) {
        loop {
            match next_draw(stream).await {
                Some(Draw::Number(n)) => scheduler.record_draw(n),
                Some(Draw::Exhausted) => return,
                None => panic!("stream closed before exhaustion"),
            }
        }
    }

    fn assert_exact_cover(log: &[u32], max_number: u32) {
        assert_eq!(log.len(), max_number as usize);
        let unique: HashSet<u32> = log.iter().copied().collect();
        assert_eq!(unique, (1..=max_number).collect::<HashSet<u32>>());
    }

    #[test]
    fn test_status_labels() {
        let labels: Vec<String> = DrawStatus::iter().map(|s| s.to_string()).collect();
        assert_eq!(labels, vec!["LOBBY", "STARTED", "PAUSED", "STOPPED"]);
    }

    #[tokio::test]
    async fn test_start_publishes_draws() {
        let mut scheduler = scheduler(10, 1);
        assert_eq!(scheduler.status(), DrawStatus::Lobby);

        let mut stream = scheduler.start().unwrap().expect("first start returns a stream");
        assert_eq!(scheduler.status(), DrawStatus::Started);

        match next_draw(&mut stream).await {
            Some(Draw::Number(n)) => assert!((1..=10).contains(&n)),
            other => panic!("expected a number, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_second_start_is_noop() {
        let mut scheduler = scheduler(10, 1);
        let _stream = scheduler.start().unwrap();

        assert!(scheduler.start().unwrap().is_none());
        assert_eq!(scheduler.status(), DrawStatus::Started);
    }

    #[tokio::test]
    async fn test_run_to_exhaustion_covers_pool() {
        let mut scheduler = scheduler(70, 1);
        let mut stream = scheduler.start().unwrap().unwrap();

        drain_to_end(&scheduler, &mut stream).await;

        assert_exact_cover(&scheduler.draw_log().snapshot(), 70);
        assert_eq!(scheduler.remaining(), 0);
        assert_eq!(scheduler.status(), DrawStatus::Started);
    }

    #[tokio::test]
    async fn test_pause_halts_without_losing_numbers() {
        let mut scheduler = scheduler(30, 5);
        let mut stream = scheduler.start().unwrap().unwrap();

        for _ in 0..3 {
            if let Some(Draw::Number(n)) = next_draw(&mut stream).await {
                scheduler.record_draw(n);
            }
        }

        assert!(scheduler.pause());
        assert_eq!(scheduler.status(), DrawStatus::Paused);
        scheduler.settle().await;

        // a draw already handed to the channel is still delivered
        while let Some(Draw::Number(n)) = stream.try_next() {
            scheduler.record_draw(n);
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(stream.try_next().is_none(), "no draws while paused");
        assert_eq!(
            scheduler.draw_log().len() + scheduler.remaining(),
            30,
            "log and pool together still hold every number"
        );
    }

    #[tokio::test]
    async fn test_resume_continues_from_same_pool() {
        let mut scheduler = scheduler(25, 1);
        let mut stream = scheduler.start().unwrap().unwrap();

        for _ in 0..5 {
            if let Some(Draw::Number(n)) = next_draw(&mut stream).await {
                scheduler.record_draw(n);
            }
        }

        assert!(scheduler.pause());
        assert!(!scheduler.pause(), "second pause is a no-op");

        assert!(scheduler.resume().await);
        assert!(!scheduler.resume().await, "second resume is a no-op");
        assert_eq!(scheduler.status(), DrawStatus::Started);

        drain_to_end(&scheduler, &mut stream).await;
        assert_exact_cover(&scheduler.draw_log().snapshot(), 25);
    }

    #[tokio::test]
    async fn test_repeated_pause_resume_cycles() {
        let mut scheduler = scheduler(40, 1);
        let mut stream = scheduler.start().unwrap().unwrap();

        for _ in 0..4 {
            if let Some(Draw::Number(n)) = next_draw(&mut stream).await {
                scheduler.record_draw(n);
            }
            scheduler.pause();
            scheduler.resume().await;
        }

        drain_to_end(&scheduler, &mut stream).await;
        assert_exact_cover(&scheduler.draw_log().snapshot(), 40);
    }

    #[tokio::test]
    async fn test_stop_is_terminal_and_closes_stream() {
        let mut scheduler = scheduler(50, 5);
        let mut stream = scheduler.start().unwrap().unwrap();
        next_draw(&mut stream).await;

        assert!(scheduler.stop());
        assert_eq!(scheduler.status(), DrawStatus::Stopped);

        // drain anything buffered, then the stream must end
        loop {
            match next_draw(&mut stream).await {
                Some(_) => continue,
                None => break,
            }
        }

        assert!(!scheduler.stop());
        assert!(scheduler.start().unwrap().is_none());
        assert!(!scheduler.resume().await);
        assert_eq!(scheduler.status(), DrawStatus::Stopped);
    }

    #[tokio::test]
    async fn test_stop_from_pause() {
        let mut scheduler = scheduler(10, 5);
        let _stream = scheduler.start().unwrap().unwrap();

        scheduler.pause();
        assert!(scheduler.stop());
        assert!(!scheduler.resume().await);
    }

    #[tokio::test]
    async fn test_lobby_transitions() {
        let mut scheduler = scheduler(10, 5);

        assert!(!scheduler.pause());
        assert!(!scheduler.resume().await);
        assert_eq!(scheduler.status(), DrawStatus::Lobby);

        assert!(scheduler.stop());
        assert!(scheduler.start().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resume_after_exhaustion_does_not_repeat_end_marker() {
        let mut scheduler = scheduler(3, 1);
        let mut stream = scheduler.start().unwrap().unwrap();
        drain_to_end(&scheduler, &mut stream).await;

        assert!(scheduler.pause());
        assert!(scheduler.resume().await);
        scheduler.pause();
        scheduler.settle().await;

        let extra = tokio::time::timeout(Duration::from_millis(50), stream.next()).await;
        assert!(extra.is_err(), "unexpected draw after exhaustion: {:?}", extra);
        assert_exact_cover(&scheduler.draw_log().snapshot(), 3);
    }

    #[tokio::test]
    async fn test_settle_aborts_task_that_ignores_cancel() {
        let mut scheduler =
            DrawScheduler::new(Duration::from_millis(5), 5, Duration::from_millis(20));
        let (guard, released) = tokio::sync::oneshot::channel::<()>();
        scheduler.retired = Some(tokio::spawn(async move {
            let _guard = guard;
            std::future::pending::<()>().await;
        }));

        tokio::time::timeout(WAIT, scheduler.settle())
            .await
            .expect("settle should give up after the handoff timeout");
        assert!(scheduler.retired.is_none());

        // the aborted task drops its end of the channel
        let closed = tokio::time::timeout(WAIT, released)
            .await
            .expect("stuck task should have been aborted");
        assert!(closed.is_err());
    }

    #[tokio::test]
    async fn test_invalid_max_number_fails_start() {
        let mut scheduler = DrawScheduler::new(
            Duration::from_millis(1),
            0,
            Duration::from_millis(100),
        );

        assert!(matches!(
            scheduler.start(),
            Err(AppError::InvalidConfiguration(_))
        ));
        assert_eq!(scheduler.status(), DrawStatus::Lobby);
    }
}
