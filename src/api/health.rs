use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    running: bool,
    players: usize,
    clients: usize,
    /// Connections bound to a player
    identified: usize,
    tick_ms: u64,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (running, players) = state
        .game
        .with_session(|s| (s.is_running(), s.player_count()))
        .unwrap_or((false, 0));

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        running,
        players,
        clients: state.room_manager.client_count(),
        identified: state.room_manager.identified_count(),
        tick_ms: state.config.game.tick_ms,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "ok",
            version: "1.0.0",
            running: true,
            players: 3,
            clients: 2,
            identified: 1,
            tick_ms: 3000,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"version\":\"1.0.0\""));
        assert!(json.contains("\"running\":true"));
        assert!(json.contains("\"players\":3"));
        assert!(json.contains("\"tickMs\":3000"));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let state = AppState::new(crate::config::Config::default());
        let Json(response) = health(State(state)).await;
        assert_eq!(response.status, "ok");
        assert_eq!(response.version, env!("CARGO_PKG_VERSION"));
        assert!(!response.running);
        assert_eq!(response.players, 0);
        assert_eq!(response.clients, 0);
        assert_eq!(response.identified, 0);
        assert_eq!(response.tick_ms, 3000);
    }
}
