//! Trading API
//!
//! Player-facing endpoints:
//! - GET /api/state - Prices, active events, news and clock
//! - GET /api/player/:id - Player account (created on first reference)
//! - GET /api/player/:id/trades - Player fill history
//! - POST /api/trade - Place a market order

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::services::TradingError;
use crate::types::{Fill, OrderRequest, OrderResponse, Player, StateSnapshot};
use crate::AppState;

/// Create trading router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/state", get(get_state))
        .route("/player/:id", get(get_player))
        .route("/player/:id/trades", get(list_trades))
        .route("/trade", post(place_order))
}

// =============================================================================
// Response Types
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Convert TradingError to HTTP response.
impl IntoResponse for TradingError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            TradingError::UnknownInstrument(_) => StatusCode::NOT_FOUND,
            TradingError::InvalidQuantity(_) => StatusCode::BAD_REQUEST,
            TradingError::NoPriceAvailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            TradingError::InsufficientFunds { .. } | TradingError::InsufficientMargin { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            TradingError::AccountBankrupt(_) => StatusCode::FORBIDDEN,
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
        });

        (status, body).into_response()
    }
}

fn validate_player_id(id: &str) -> Result<&str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(AppError::BadRequest("Player id must not be empty".to_string()));
    }
    Ok(id)
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /api/state
async fn get_state(State(state): State<AppState>) -> Result<Json<ApiResponse<StateSnapshot>>> {
    let snapshot = state.game.with_session(|s| s.state_snapshot())?;
    Ok(Json(ApiResponse { data: snapshot }))
}

/// GET /api/player/:id
async fn get_player(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Player>>> {
    let id = validate_player_id(&id)?;
    let player = state.game.with_session(|s| s.player_snapshot(id))?;
    Ok(Json(ApiResponse { data: player }))
}

/// GET /api/player/:id/trades
async fn list_trades(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Fill>>>> {
    let id = validate_player_id(&id)?;
    let fills = state.game.with_session(|s| s.fills(id).to_vec())?;
    Ok(Json(ApiResponse { data: fills }))
}

/// POST /api/trade
async fn place_order(
    State(state): State<AppState>,
    Json(request): Json<OrderRequest>,
) -> Result<Json<ApiResponse<OrderResponse>>> {
    let player_id = validate_player_id(&request.player_id)?;
    let order = state
        .game
        .submit_order(player_id, &request.ticker, request.side, request.quantity)??;
    Ok(Json(ApiResponse { data: order }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Ticker;

    #[test]
    fn test_error_codes() {
        let cases = [
            (
                TradingError::UnknownInstrument("TSLA".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (TradingError::InvalidQuantity(0.5), StatusCode::BAD_REQUEST),
            (
                TradingError::NoPriceAvailable(Ticker::Bank),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                TradingError::InsufficientFunds {
                    needed: 2.0,
                    available: 1.0,
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                TradingError::AccountBankrupt("x".to_string()),
                StatusCode::FORBIDDEN,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_validate_player_id() {
        assert_eq!(validate_player_id("  alice ").unwrap(), "alice");
        assert!(validate_player_id("   ").is_err());
    }
}
