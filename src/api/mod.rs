pub mod game;
pub mod health;
pub mod trading;

use crate::AppState;
use axum::Router;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/game", game::router())
        .nest("/api", trading::router())
}
