//! Session Registry
//!
//! The sole shared mutable state of the server: the mapping from room id to
//! the set of live connections in that room, plus the fan-out broadcast that
//! iterates it. One exclusive lock guards the nested map and is held for the
//! full duration of every operation, including broadcast writes. That
//! serializes unrelated rooms behind a slow peer; an accepted limit of this
//! design (per-room locks or a per-room broadcast task would be the scalable
//! evolution).

use std::collections::HashMap;

use axum::extract::ws::Message;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::network::protocol::Event;

/// Identifier of one live connection. A player holding several sockets owns
/// several of these; the registry never deduplicates by player.
pub type ConnId = Uuid;

struct RoomConnection {
    player_id: Uuid,
    sender: mpsc::UnboundedSender<Message>,
    cancel: CancellationToken,
}

/// Live-connection registry, keyed room id -> connection id.
#[derive(Default)]
pub struct SessionRegistry {
    rooms: Mutex<HashMap<Uuid, HashMap<ConnId, RoomConnection>>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a connection under a room, creating the bucket lazily.
    /// Returns the new connection's id.
    pub async fn register(
        &self,
        room_id: Uuid,
        player_id: Uuid,
        sender: mpsc::UnboundedSender<Message>,
        cancel: CancellationToken,
    ) -> ConnId {
        let conn_id = Uuid::new_v4();
        let mut rooms = self.rooms.lock().await;
        rooms.entry(room_id).or_default().insert(
            conn_id,
            RoomConnection {
                player_id,
                sender,
                cancel,
            },
        );
        conn_id
    }

    /// Remove a connection. The bucket is deleted the moment it empties; a
    /// bucket never exists with zero entries.
    ///
    /// Returns `false` without error when the connection or bucket is
    /// already gone. That boolean is the at-most-once gate for teardown:
    /// concurrent triggers (read error racing a failed broadcast write)
    /// serialize on the registry lock and only one caller sees `true`.
    pub async fn unregister(&self, room_id: Uuid, conn_id: ConnId) -> bool {
        let mut rooms = self.rooms.lock().await;
        let Some(bucket) = rooms.get_mut(&room_id) else {
            return false;
        };
        let removed = bucket.remove(&conn_id).is_some();
        if bucket.is_empty() {
            rooms.remove(&room_id);
        }
        removed
    }

    /// Drop a room's bucket outright. Idempotent; used by the final
    /// teardown step after the store confirms zero remaining players.
    pub async fn remove_room(&self, room_id: Uuid) {
        let mut rooms = self.rooms.lock().await;
        rooms.remove(&room_id);
    }

    /// Number of live connections currently registered under a room.
    pub async fn room_size(&self, room_id: Uuid) -> usize {
        let rooms = self.rooms.lock().await;
        rooms.get(&room_id).map_or(0, HashMap::len)
    }

    /// Fan an event out to every connection in a room.
    ///
    /// An unknown room or empty bucket is a silent no-op. A failed write to
    /// one connection fires that connection's cancellation handle (its
    /// receive loop then runs the normal disconnect path) and never aborts
    /// delivery to the rest. Per-connection ordering across successive
    /// broadcasts is preserved by each connection's channel.
    ///
    /// Returns the number of connections written to.
    pub async fn broadcast(&self, room_id: Uuid, event: &Event) -> usize {
        let payload = match serde_json::to_vec(event) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(%room_id, error = %err, "failed to serialize broadcast event");
                return 0;
            }
        };

        let rooms = self.rooms.lock().await;
        let Some(bucket) = rooms.get(&room_id) else {
            return 0;
        };

        let mut delivered = 0;
        for (conn_id, conn) in bucket {
            if conn.sender.send(Message::Binary(payload.clone())).is_err() {
                warn!(%room_id, %conn_id, player_id = %conn.player_id,
                    "failed to send message to client, cancelling connection");
                conn.cancel.cancel();
            } else {
                delivered += 1;
            }
        }
        debug!(%room_id, delivered, "broadcast dispatched");
        delivered
    }
}
