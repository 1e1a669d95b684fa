use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::types::{ClientMessage, ServerMessage};
use crate::AppState;

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    // Create a channel for sending messages to this client
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    // Register the client
    let client_id = state.room_manager.register(tx);
    info!("WebSocket client connected: {}", client_id);

    // Spawn a task to forward messages from the channel to the WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    });

    send_current_state(&state, client_id);

    // Handle incoming messages
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                debug!("Received message from {}: {}", client_id, text);
                handle_message(&state, client_id, &text);
            }
            Ok(Message::Close(_)) => {
                info!("WebSocket client disconnecting: {}", client_id);
                break;
            }
            Ok(Message::Ping(_)) => {
                // Pong is handled automatically by axum
                debug!("Received ping from {}", client_id);
            }
            Err(e) => {
                error!("WebSocket error for {}: {}", client_id, e);
                break;
            }
            _ => {}
        }
    }

    // Clean up
    state.room_manager.unregister(client_id);
    send_task.abort();
    info!("WebSocket client disconnected: {}", client_id);
}

/// Latest prices and date, so a new client does not wait a full tick.
fn send_current_state(state: &AppState, client_id: Uuid) {
    let snapshot = state
        .game
        .with_session(|s| (s.tick_snapshot(), s.current_date()));
    if let Ok((tick, date)) = snapshot {
        if let Some(date) = date {
            send_message(state, client_id, &ServerMessage::Date { data: date });
        }
        send_message(state, client_id, &ServerMessage::Tick { data: tick });
    }
}

fn handle_message(state: &AppState, client_id: Uuid, text: &str) {
    let msg: ClientMessage = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => {
            send_error(state, client_id, &format!("Invalid message: {}", e));
            return;
        }
    };

    match msg {
        ClientMessage::Identify { player_id } => {
            let player_id = player_id.trim().to_string();
            if player_id.is_empty() {
                send_error(state, client_id, "Player id must not be empty");
                return;
            }
            state.room_manager.identify(client_id, &player_id);
            debug!("Client {} identified as {}", client_id, player_id);

            match state.game.with_session(|s| s.player_snapshot(&player_id)) {
                Ok(player) => {
                    send_message(state, client_id, &ServerMessage::PlayerUpdate { data: player })
                }
                Err(e) => send_error(state, client_id, &e.to_string()),
            }
        }
        ClientMessage::Trade {
            ticker,
            side,
            quantity,
        } => {
            let Some(player_id) = state.room_manager.player_of(client_id) else {
                send_error(state, client_id, "Identify before trading");
                return;
            };

            let response = match state.game.submit_order(&player_id, &ticker, side, quantity) {
                Ok(Ok(order)) => ServerMessage::TradeFilled {
                    fill: order.fill,
                    player: order.player,
                },
                Ok(Err(e)) => ServerMessage::TradeRejected {
                    error: e.to_string(),
                    code: e.code().to_string(),
                },
                Err(e) => ServerMessage::Error {
                    error: e.to_string(),
                },
            };
            send_message(state, client_id, &response);
        }
    }
}

fn send_message(state: &AppState, client_id: Uuid, msg: &ServerMessage) {
    if let Ok(json) = serde_json::to_string(msg) {
        state.room_manager.send(client_id, &json);
    }
}

fn send_error(state: &AppState, client_id: Uuid, error: &str) {
    let msg = ServerMessage::Error {
        error: error.to_string(),
    };
    send_message(state, client_id, &msg);
}
