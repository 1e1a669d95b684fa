//! Game Admin API
//!
//! Operator endpoints:
//! - POST /game/start - Start (or resume) the session
//! - POST /game/stop - Pause the session
//! - POST /game/reset - Stop and clear everything
//! - GET /game/players - All player accounts
//! - GET /game/leaderboard - Players ranked by total value

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use crate::api::trading::ApiResponse;
use crate::error::Result;
use crate::types::{LeaderboardEntry, Player};
use crate::AppState;

/// Create game admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/start", post(start_game))
        .route("/stop", post(stop_game))
        .route("/reset", post(reset_game))
        .route("/players", get(list_players))
        .route("/leaderboard", get(get_leaderboard))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStatus {
    pub running: bool,
    /// Whether this call changed the state
    pub changed: bool,
    pub tick: u64,
}

fn status(state: &AppState, changed: bool) -> Result<Json<GameStatus>> {
    let (running, tick) = state
        .game
        .with_session(|s| (s.is_running(), s.tick_count()))?;
    Ok(Json(GameStatus {
        running,
        changed,
        tick,
    }))
}

/// POST /game/start
async fn start_game(State(state): State<AppState>) -> Result<Json<GameStatus>> {
    let changed = state.game.start()?;
    status(&state, changed)
}

/// POST /game/stop
async fn stop_game(State(state): State<AppState>) -> Result<Json<GameStatus>> {
    let changed = state.game.stop()?;
    status(&state, changed)
}

/// POST /game/reset
async fn reset_game(State(state): State<AppState>) -> Result<Json<GameStatus>> {
    state.game.reset()?;
    info!("Game reset by operator");
    status(&state, true)
}

/// GET /game/players
async fn list_players(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<BTreeMap<String, Player>>>> {
    let players = state.game.with_session(|s| s.players().clone())?;
    Ok(Json(ApiResponse { data: players }))
}

/// GET /game/leaderboard
async fn get_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<LeaderboardEntry>>>> {
    let leaderboard = state.game.with_session(|s| s.leaderboard())?;
    Ok(Json(ApiResponse { data: leaderboard }))
}
