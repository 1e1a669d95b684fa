//! Integration tests for API endpoints
//!
//! Drives the full router in-process with `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use tradefest::config::Config;
use tradefest::{app, AppState};

fn test_app() -> (Router, AppState) {
    let state = AppState::new(Config::default());
    (app(state.clone()), state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn order(player: &str, ticker: &str, side: &str, quantity: f64) -> Value {
    json!({
        "playerId": player,
        "ticker": ticker,
        "side": side,
        "quantity": quantity,
    })
}

// =============================================================================
// Health & admin
// =============================================================================

mod admin_tests {
    use super::*;

    #[tokio::test]
    async fn test_health() {
        let (app, _) = test_app();
        let (status, body) = send(&app, get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["running"], false);
        assert_eq!(body["players"], 0);
        assert_eq!(body["identified"], 0);
        assert_eq!(body["tickMs"], 3000);
    }

    #[tokio::test]
    async fn test_start_stop_reset() {
        let (app, state) = test_app();

        let (status, body) = send(&app, post("/game/start")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["running"], true);
        assert_eq!(body["changed"], true);

        let (_, body) = send(&app, post("/game/start")).await;
        assert_eq!(body["changed"], false);

        let (status, body) = send(&app, post("/game/stop")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["running"], false);
        assert_eq!(body["changed"], true);

        send(&app, post_json("/api/trade", order("alice", "BANK", "buy", 1.0))).await;
        let (status, body) = send(&app, post("/game/reset")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tick"], 0);
        assert_eq!(state.game.with_session(|s| s.player_count()).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_state_before_start() {
        let (app, _) = test_app();
        let (status, body) = send(&app, get("/api/state")).await;
        assert_eq!(status, StatusCode::OK);
        let data = &body["data"];
        assert_eq!(data["running"], false);
        assert_eq!(data["tick"], 0);
        assert_eq!(data["prices"]["BANK"], json!([2300.0]));
        assert_eq!(data["prices"].as_object().unwrap().len(), 12);
        assert!(data["news"].as_array().unwrap().is_empty());
        assert!(data.get("date").is_none());
    }

    #[tokio::test]
    async fn test_state_after_ticks() {
        let (app, state) = test_app();
        send(&app, post("/game/start")).await;
        state.game.tick_once().unwrap();
        state.game.tick_once().unwrap();
        send(&app, post("/game/stop")).await;

        let (_, body) = send(&app, get("/api/state")).await;
        let data = &body["data"];
        assert_eq!(data["tick"], 2);
        assert_eq!(data["prices"]["GOLD"].as_array().unwrap().len(), 3);
        assert_eq!(data["date"]["dayIndex"], 1);
        assert!(data["storyRoute"].is_string());
    }
}

// =============================================================================
// Players & trading
// =============================================================================

mod trading_tests {
    use super::*;

    #[tokio::test]
    async fn test_player_created_on_first_reference() {
        let (app, _) = test_app();
        let (status, body) = send(&app, get("/api/player/newbie")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], "newbie");
        assert_eq!(body["data"]["cash"], 100_000_000.0);
        assert_eq!(body["data"]["bankrupt"], false);
        assert_eq!(body["data"]["positions"]["SEMI"]["quantity"], 0);
    }

    #[tokio::test]
    async fn test_trade_success() {
        let (app, _) = test_app();
        let (status, body) = send(
            &app,
            post_json("/api/trade", order("alice", "BANK", "buy", 100.0)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let data = &body["data"];
        assert_eq!(data["id"], "alice");
        assert_eq!(data["cash"], 100_000_000.0 - 230_000.0);
        assert_eq!(data["positions"]["BANK"]["quantity"], 100);
        assert_eq!(data["positions"]["BANK"]["avgPrice"], 2300.0);
        assert_eq!(data["fill"]["filledQuantity"], 100);
        assert_eq!(data["fill"]["side"], "buy");
    }

    #[tokio::test]
    async fn test_trade_history() {
        let (app, _) = test_app();
        send(&app, post_json("/api/trade", order("bob", "UTIL", "sell", 50.0))).await;
        send(&app, post_json("/api/trade", order("bob", "UTIL", "buy", 80.0))).await;

        let (status, body) = send(&app, get("/api/player/bob/trades")).await;
        assert_eq!(status, StatusCode::OK);
        let fills = body["data"].as_array().unwrap();
        assert_eq!(fills.len(), 2);
        assert_eq!(fills[0]["side"], "sell");
        assert_eq!(fills[1]["requestedQuantity"], 80);
        assert_eq!(fills[1]["filledQuantity"], 50);
        assert_eq!(fills[1]["positionAfter"]["quantity"], 0);
    }

    #[tokio::test]
    async fn test_trade_insufficient_funds() {
        let (app, _) = test_app();
        let (status, body) = send(
            &app,
            post_json("/api/trade", order("carol", "GOLD", "buy", 10_000.0)),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "INSUFFICIENT_FUNDS");
    }

    #[tokio::test]
    async fn test_trade_unknown_instrument() {
        let (app, _) = test_app();
        let (status, body) = send(
            &app,
            post_json("/api/trade", order("carol", "TSLA", "buy", 1.0)),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "UNKNOWN_INSTRUMENT");
    }

    #[tokio::test]
    async fn test_trade_invalid_quantity() {
        let (app, _) = test_app();
        let (status, body) = send(
            &app,
            post_json("/api/trade", order("carol", "BANK", "buy", 0.0)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_QUANTITY");
    }

    #[tokio::test]
    async fn test_trade_blank_player() {
        let (app, _) = test_app();
        let (status, body) =
            send(&app, post_json("/api/trade", order("  ", "BANK", "buy", 1.0))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);
    }

    #[tokio::test]
    async fn test_leaderboard_and_players() {
        let (app, _) = test_app();
        send(&app, get("/api/player/dave")).await;
        send(&app, get("/api/player/erin")).await;

        let (status, body) = send(&app, get("/game/players")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_object().unwrap().len(), 2);

        let (status, body) = send(&app, get("/game/leaderboard")).await;
        assert_eq!(status, StatusCode::OK);
        let board = body["data"].as_array().unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0]["rank"], 1);
        assert_eq!(board[1]["rank"], 2);
    }
}
