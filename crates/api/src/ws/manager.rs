use std::collections::{HashMap, HashSet};

use axum::body::Bytes;
use axum::extract::ws::Message;
use civicdesk_core::channels::officer_channel;
use civicdesk_core::roles::Role;
use civicdesk_core::types::{DbId, Timestamp};
use civicdesk_core::visibility::can_view;
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single WebSocket connection.
pub struct WsConnection {
    /// Authenticated user ID.
    pub user_id: DbId,
    /// The user's role, captured at upgrade time.
    pub role: Role,
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// When this connection was established.
    pub connected_at: Timestamp,
}

/// Manages all active WebSocket connections and their channel subscriptions.
///
/// A channel is a named fan-out group (`ticket_{id}` for a ticket's live
/// thread, `notifications_{user_id}` for an officer's personal alerts).
/// Visibility is enforced here, not at subscribe time alone: every publish
/// to a ticket channel re-checks each subscriber against the ticket's
/// current participants, so a reassignment immediately silences the old
/// officer's open sockets.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
    channels: RwLock<HashMap<String, HashSet<String>>>,
}

impl WsManager {
    /// Create a new, empty connection manager.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(
        &self,
        conn_id: String,
        user_id: DbId,
        role: Role,
    ) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            user_id,
            role,
            sender: tx,
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    /// Remove a connection by its ID, dropping all of its subscriptions.
    pub async fn remove(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);
        let mut channels = self.channels.write().await;
        channels.retain(|_, members| {
            members.remove(conn_id);
            !members.is_empty()
        });
    }

    /// Subscribe a connection to a named channel.
    ///
    /// Authorization for ticket channels (visibility) and officer channels
    /// (identity + role) is the caller's responsibility at upgrade time;
    /// ticket publishes re-check visibility regardless.
    pub async fn subscribe(&self, channel: &str, conn_id: &str) {
        self.channels
            .write()
            .await
            .entry(channel.to_string())
            .or_default()
            .insert(conn_id.to_string());
    }

    /// Unsubscribe a connection from a named channel.
    pub async fn unsubscribe(&self, channel: &str, conn_id: &str) {
        let mut channels = self.channels.write().await;
        if let Some(members) = channels.get_mut(channel) {
            members.remove(conn_id);
            if members.is_empty() {
                channels.remove(channel);
            }
        }
    }

    /// Publish a message to a ticket channel, re-checking visibility for
    /// every subscriber against the ticket's current participants.
    ///
    /// Subscribers who can no longer view the ticket are skipped (their
    /// subscription was authorized against an older assignment). Returns the
    /// number of connections the message was sent to.
    pub async fn publish_ticket(
        &self,
        channel: &str,
        youth_id: DbId,
        officer_id: Option<DbId>,
        message: Message,
    ) -> usize {
        let channels = self.channels.read().await;
        let Some(members) = channels.get(channel) else {
            return 0;
        };
        let conns = self.connections.read().await;
        let mut count = 0;
        for conn_id in members {
            let Some(conn) = conns.get(conn_id) else {
                continue;
            };
            if !can_view(conn.role, conn.user_id, youth_id, officer_id) {
                tracing::debug!(
                    conn_id = %conn_id,
                    user_id = conn.user_id,
                    channel = %channel,
                    "skipping subscriber no longer authorized for ticket channel"
                );
                continue;
            }
            let _ = conn.sender.send(message.clone());
            count += 1;
        }
        count
    }

    /// Publish a message to an officer's personal notification channel.
    ///
    /// Each recipient must actually be the named officer; a stale or forged
    /// subscription never receives another user's alerts. Returns the number
    /// of connections the message was sent to.
    pub async fn publish_officer(&self, officer_id: DbId, message: Message) -> usize {
        let channel = officer_channel(officer_id);
        let channels = self.channels.read().await;
        let Some(members) = channels.get(&channel) else {
            return 0;
        };
        let conns = self.connections.read().await;
        let mut count = 0;
        for conn_id in members {
            let Some(conn) = conns.get(conn_id) else {
                continue;
            };
            if conn.user_id != officer_id || conn.role != Role::Officer {
                continue;
            }
            let _ = conn.sender.send(message.clone());
            count += 1;
        }
        count
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Return the number of subscribers on a channel.
    pub async fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .read()
            .await
            .get(channel)
            .map_or(0, |members| members.len())
    }

    /// Send a Close frame to every connection, then clear the maps.
    ///
    /// Used during graceful shutdown to notify all clients before the
    /// server stops accepting new connections.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        self.channels.write().await.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    ///
    /// Used by the heartbeat task to keep connections alive and detect
    /// stale ones.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
