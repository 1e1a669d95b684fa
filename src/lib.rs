//! Tradefest - multiplayer stock-trading game server

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod types;
pub mod websocket;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use services::{Catalog, GameServer, Session};
use websocket::RoomManager;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub game: Arc<GameServer>,
    pub room_manager: Arc<RoomManager>,
}

impl AppState {
    /// State over the built-in catalog.
    pub fn new(config: Config) -> Self {
        Self::with_catalog(config, Catalog::builtin())
    }

    pub fn with_catalog(config: Config, catalog: Catalog) -> Self {
        let session = Session::new(Arc::new(catalog), config.game.session_settings());
        let game = GameServer::new(
            session,
            config.game.tick_interval(),
            config.broadcast_capacity,
        );
        Self {
            config: Arc::new(config),
            game,
            room_manager: RoomManager::new(),
        }
    }
}

/// Build the HTTP + WebSocket router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api::router())
        .route("/ws", get(websocket::ws_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
