use std::sync::Arc;

use lotto::{
    BoardConfig, ChatId, GameConfig, GameService, PlayerIdentity, RenderDirective,
    SessionRegistry,
};

use super::mocks::MockMessageSink;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub service: GameService,
    pub mock_sink: Arc<MockMessageSink>,
    pub chat_id: ChatId,
    pub players: Vec<PlayerIdentity>,
    /// Directives returned while registering, in player order
    pub registrations: Vec<RenderDirective>,
}

pub struct TestSetupBuilder {
    players: Vec<String>,
    chat_id: ChatId,
    config: GameConfig,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            players: vec![],
            chat_id: -1001,
            config: GameConfig {
                draw_interval_ms: 2,
                handoff_timeout_ms: 1_000,
                board: BoardConfig {
                    rows: 9,
                    cols: 9,
                    cells_per_row: 5,
                    column_ranges: Vec::new(),
                },
                ..Default::default()
            },
        }
    }

    pub fn with_players(mut self, players: Vec<&str>) -> Self {
        self.players = players.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_two_players(self) -> Self {
        self.with_players(vec!["alice_w", "bobby_b"])
    }

    pub fn with_max_number(mut self, max_number: u32) -> Self {
        self.config.max_number = max_number;
        self
    }

    pub fn with_draw_interval_ms(mut self, interval_ms: u64) -> Self {
        self.config.draw_interval_ms = interval_ms;
        self
    }

    pub async fn build(self) -> TestSetup {
        let registry = Arc::new(SessionRegistry::new(self.config).unwrap());
        let mock_sink = Arc::new(MockMessageSink::new());
        let service = GameService::new(registry, mock_sink.clone());

        service.open_session(self.chat_id).await.unwrap();

        let mut players = Vec::new();
        let mut registrations = Vec::new();
        for (i, handle) in self.players.iter().enumerate() {
            let identity = PlayerIdentity::new(i as i64 + 1, handle.as_str())
                .with_name(handle.to_uppercase(), "");
            registrations.push(service.register(self.chat_id, identity.clone()).await.unwrap());
            players.push(identity);
        }

        TestSetup {
            service,
            mock_sink,
            chat_id: self.chat_id,
            players,
            registrations,
        }
    }
}
