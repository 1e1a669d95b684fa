use super::{
    DateSnapshot, Fill, LeaderboardEntry, NewsEntry, Player, ResolvedEvent, TickSnapshot,
    TradeSide,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Incoming WebSocket message from client.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Bind this connection to a player id
    Identify {
        #[serde(alias = "playerId")]
        player_id: String,
    },
    /// Place an order as the identified player
    Trade {
        ticker: String,
        side: TradeSide,
        quantity: f64,
    },
}

/// Outgoing WebSocket message to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Latest prices after a tick
    Tick {
        data: TickSnapshot,
    },
    /// Every player after the tick's recompute
    Players {
        data: BTreeMap<String, Player>,
    },
    /// Current business day
    Date {
        data: DateSnapshot,
    },
    /// A story or random event fired this tick
    News {
        event: ResolvedEvent,
        entry: NewsEntry,
    },
    GameStart {
        timestamp: i64,
    },
    GameStop {
        timestamp: i64,
    },
    /// Calendar exhausted; final standings
    GameEnd {
        leaderboard: Vec<LeaderboardEntry>,
        timestamp: i64,
    },
    GameReset {
        timestamp: i64,
    },
    Bankrupt {
        player_id: String,
        total_value: f64,
    },
    /// Snapshot for the identified player
    PlayerUpdate {
        data: Player,
    },
    TradeFilled {
        fill: Fill,
        player: Player,
    },
    TradeRejected {
        error: String,
        code: String,
    },
    Error {
        error: String,
    },
}

impl ServerMessage {
    /// True for messages every connection should receive.
    pub fn is_public(&self) -> bool {
        !matches!(
            self,
            ServerMessage::PlayerUpdate { .. }
                | ServerMessage::TradeFilled { .. }
                | ServerMessage::TradeRejected { .. }
                | ServerMessage::Error { .. }
        )
    }
}
