use lotto::{
    config::GameConfig,
    game::{GameService, MessageSink, TracingSink},
    session::{start_cleanup_task, CleanupConfig, PlayerIdentity, SessionRegistry},
    shared::AppError,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEMO_CHAT: i64 = -100_200;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lotto=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match GameConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Refusing to start with invalid configuration");
            return;
        }
    };

    info!(
        draw_interval_ms = config.draw_interval_ms,
        max_number = config.max_number,
        "Starting lotto game host"
    );

    let registry = match SessionRegistry::new(config) {
        Ok(registry) => Arc::new(registry),
        Err(e) => {
            error!(error = %e, "Failed to build session registry");
            return;
        }
    };

    // No chat transport is wired up here; directives are only logged
    let sink: Arc<dyn MessageSink> = Arc::new(TracingSink::new());
    let service = GameService::new(registry.clone(), sink.clone());

    tokio::spawn(start_cleanup_task(registry, CleanupConfig::default()));

    if let Err(e) = run_demo(&service, sink.as_ref()).await {
        error!(error = %e, "Demo game failed");
    }
}

/// Plays one scripted game in a single chat
async fn run_demo(service: &GameService, sink: &dyn MessageSink) -> Result<(), AppError> {
    sink.render(service.open_session(DEMO_CHAT).await?).await?;

    let players = [
        PlayerIdentity::new(1, "alice_w").with_name("Alice", "Wong"),
        PlayerIdentity::new(2, "bobby_b").with_name("Bob", "Brown"),
    ];
    for identity in players {
        sink.render(service.register(DEMO_CHAT, identity).await?).await?;
    }

    if let Some(directive) = service.start(DEMO_CHAT).await?.directive() {
        sink.render(directive.clone()).await?;
    }

    // give the draw task a few ticks
    let interval = service.registry().config().draw_interval();
    tokio::time::sleep(interval.saturating_mul(3) + Duration::from_millis(50)).await;

    sink.render(service.mark_wait(DEMO_CHAT, 1).await?).await?;
    let bingo = service.declare_bingo(DEMO_CHAT, 1).await?;
    info!(
        drawn = bingo.snapshot.as_ref().map_or(0, |s| s.draw_log.len()),
        "Bingo claimed"
    );
    sink.render(bingo).await?;

    if let Some(directive) = service.stop(DEMO_CHAT).await?.directive() {
        sink.render(directive.clone()).await?;
    }

    match service.close_session(DEMO_CHAT).await {
        Ok(_) => info!(chat_id = DEMO_CHAT, "Demo chat closed"),
        Err(e) => warn!(chat_id = DEMO_CHAT, error = %e, "Demo chat already gone"),
    }
    Ok(())
}
