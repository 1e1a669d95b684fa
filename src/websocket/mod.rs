mod handler;
mod room_manager;

pub use handler::ws_handler;
pub use room_manager::{ClientConnection, RoomManager};

use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::services::GameServer;
use crate::types::ServerMessage;

/// Forward every game broadcast to all connected clients. After each player
/// map, identified clients also get their own account.
pub fn spawn_fanout(game: Arc<GameServer>, room_manager: Arc<RoomManager>) -> JoinHandle<()> {
    let mut rx = game.subscribe();
    tokio::spawn(async move {
        loop {
            let msg = match rx.recv().await {
                Ok(msg) => msg,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("WebSocket fan-out lagged, dropped {} messages", skipped);
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            if !msg.is_public() {
                debug!("Dropping private message on the broadcast channel");
                continue;
            }

            match serde_json::to_string(&msg) {
                Ok(json) => room_manager.broadcast_all(&json),
                Err(e) => {
                    warn!("Failed to serialize broadcast: {}", e);
                    continue;
                }
            }

            if let ServerMessage::Players { data } = &msg {
                for client in room_manager.clients.iter() {
                    let Some(player) = client.player_id.as_ref().and_then(|id| data.get(id))
                    else {
                        continue;
                    };
                    let update = ServerMessage::PlayerUpdate {
                        data: player.clone(),
                    };
                    if let Ok(json) = serde_json::to_string(&update) {
                        let _ = client.tx.send(json);
                    }
                }
            }
        }
        debug!("WebSocket fan-out stopped");
    })
}
