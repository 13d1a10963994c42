//! Connection management for observer WebSocket clients.
//!
//! Every connected observer gets every broadcast; there is no per-client
//! routing.

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use minebot_protocol::ServerMessage;

/// Information about a connected observer.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    /// Unique ID for this connection
    pub connection_id: Uuid,
    /// Peer address as reported by the server, if known
    pub peer: Option<String>,
}

/// Manages all active observer connections.
pub struct ConnectionManager {
    connections: RwLock<HashMap<Uuid, (ConnectionInfo, mpsc::Sender<ServerMessage>)>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection.
    pub async fn register(
        &self,
        connection_id: Uuid,
        peer: Option<String>,
        sender: mpsc::Sender<ServerMessage>,
    ) {
        let info = ConnectionInfo {
            connection_id,
            peer,
        };
        let mut connections = self.connections.write().await;
        connections.insert(connection_id, (info, sender));
        tracing::debug!(connection_id = %connection_id, "Connection registered");
    }

    /// Unregister a connection.
    pub async fn unregister(&self, connection_id: Uuid) {
        let mut connections = self.connections.write().await;
        if connections.remove(&connection_id).is_some() {
            tracing::debug!(connection_id = %connection_id, "Connection unregistered");
        }
    }

    /// Get connection info by ID.
    pub async fn get(&self, connection_id: Uuid) -> Option<ConnectionInfo> {
        let connections = self.connections.read().await;
        connections.get(&connection_id).map(|(info, _)| info.clone())
    }

    pub async fn count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a message to every observer. Slow observers miss messages
    /// rather than stall the sender.
    pub async fn broadcast(&self, message: ServerMessage) {
        let connections = self.connections.read().await;
        for (info, sender) in connections.values() {
            if let Err(e) = sender.try_send(message.clone()) {
                tracing::warn!(
                    connection_id = %info.connection_id,
                    error = %e,
                    "Failed to broadcast message"
                );
            }
        }
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn broadcast_reaches_every_registered_observer() {
        let manager = ConnectionManager::new();
        let (tx_a, mut rx_a) = mpsc::channel(4);
        let (tx_b, mut rx_b) = mpsc::channel(4);
        let a = Uuid::new_v4();
        manager.register(a, None, tx_a).await;
        manager
            .register(Uuid::new_v4(), Some("127.0.0.1:5000".into()), tx_b)
            .await;

        manager.broadcast(ServerMessage::Pong).await;

        assert_eq!(rx_a.recv().await, Some(ServerMessage::Pong));
        assert_eq!(rx_b.recv().await, Some(ServerMessage::Pong));
        assert_eq!(manager.count().await, 2);

        manager.unregister(a).await;
        assert!(manager.get(a).await.is_none());
        assert_eq!(manager.count().await, 1);
    }

    #[tokio::test]
    async fn full_observer_does_not_block_broadcast() {
        let manager = ConnectionManager::new();
        let (tx, mut rx) = mpsc::channel(1);
        manager.register(Uuid::new_v4(), None, tx).await;

        manager.broadcast(ServerMessage::Pong).await;
        manager
            .broadcast(ServerMessage::Reply {
                speaker: "Bot".into(),
                text: "dropped".into(),
            })
            .await;

        assert_eq!(rx.recv().await, Some(ServerMessage::Pong));
        assert!(rx.try_recv().is_err());
    }
}
