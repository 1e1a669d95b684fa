use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// A connected client.
pub struct ClientConnection {
    /// Player this connection acts for, once identified.
    pub player_id: Option<String>,
    /// Channel to send messages to the client.
    pub tx: mpsc::UnboundedSender<String>,
}

/// Registry of WebSocket clients.
pub struct RoomManager {
    /// Connections keyed by client ID.
    pub clients: DashMap<Uuid, ClientConnection>,
}

impl RoomManager {
    /// Create a new room manager.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a new client.
    pub fn register(&self, tx: mpsc::UnboundedSender<String>) -> Uuid {
        let client_id = Uuid::new_v4();
        self.clients.insert(
            client_id,
            ClientConnection {
                player_id: None,
                tx,
            },
        );
        client_id
    }

    /// Unregister a client.
    pub fn unregister(&self, client_id: Uuid) {
        self.clients.remove(&client_id);
    }

    /// Bind a client to a player id. Returns false for unknown clients.
    pub fn identify(&self, client_id: Uuid, player_id: &str) -> bool {
        match self.clients.get_mut(&client_id) {
            Some(mut client) => {
                client.player_id = Some(player_id.to_string());
                true
            }
            None => false,
        }
    }

    pub fn player_of(&self, client_id: Uuid) -> Option<String> {
        self.clients
            .get(&client_id)
            .and_then(|c| c.player_id.clone())
    }

    /// Send a message to one client.
    pub fn send(&self, client_id: Uuid, message: &str) -> bool {
        self.clients
            .get(&client_id)
            .map(|c| c.tx.send(message.to_string()).is_ok())
            .unwrap_or(false)
    }

    /// Broadcast a message to all connected clients.
    pub fn broadcast_all(&self, message: &str) {
        for client in self.clients.iter() {
            let _ = client.tx.send(message.to_string());
        }
    }

    /// Get the number of connected clients.
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Number of connections bound to a player.
    pub fn identified_count(&self) -> usize {
        self.clients
            .iter()
            .filter(|c| c.player_id.is_some())
            .count()
    }
}

impl Default for RoomManager {
    fn default() -> Self {
        Self {
            clients: DashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_unregister() {
        let manager = RoomManager::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = manager.register(tx);
        assert_eq!(manager.client_count(), 1);
        manager.unregister(id);
        assert_eq!(manager.client_count(), 0);
    }

    #[test]
    fn test_identify() {
        let manager = RoomManager::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = manager.register(tx);
        assert_eq!(manager.player_of(id), None);
        assert!(manager.identify(id, "alice"));
        assert_eq!(manager.player_of(id), Some("alice".to_string()));
        assert_eq!(manager.identified_count(), 1);
        assert!(!manager.identify(Uuid::new_v4(), "bob"));
    }

    #[test]
    fn test_broadcast_all_reaches_every_client() {
        let manager = RoomManager::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        manager.register(tx1);
        manager.register(tx2);
        manager.broadcast_all("hello");
        assert_eq!(rx1.try_recv().unwrap(), "hello");
        assert_eq!(rx2.try_recv().unwrap(), "hello");
    }

    #[test]
    fn test_send_to_one() {
        let manager = RoomManager::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = manager.register(tx);
        assert!(manager.send(id, "private"));
        assert_eq!(rx.try_recv().unwrap(), "private");
        assert!(!manager.send(Uuid::new_v4(), "lost"));
    }
}
