//! Persistence Boundary
//!
//! The durable view of rooms and players lives behind the [`RoomStore`]
//! trait. The session core only ever consumes this surface; the relational
//! implementation (schema, migrations, pooling) is a separate concern.
//! [`MemoryStore`] backs tests and standalone runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::network::protocol::base64_bytes;

pub mod memory;

pub use memory::MemoryStore;

/// Durable room row.
#[derive(Debug, Clone, Serialize)]
pub struct RoomRecord {
    /// Room identifier.
    pub id: Uuid,
    /// Coarse room state, e.g. `"waiting"`.
    pub state: String,
    /// Current round number.
    pub round: i32,
    /// Serialized game result, empty until the game ends.
    #[serde(with = "base64_bytes")]
    pub result: Vec<u8>,
    /// External deck identifier drawn at creation, when a deck API is wired.
    pub deck_id: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Durable player row, scoped to one room.
#[derive(Debug, Clone)]
pub struct PlayerRecord {
    /// Player identifier.
    pub id: Uuid,
    /// Display name given at room entry.
    pub name: String,
    /// The room this player joined.
    pub room_id: Uuid,
    /// Join order assigned at room entry.
    pub join_order: i32,
}

/// Store failures. The core treats every failure as opaque; there is no
/// transient/permanent distinction and no retries.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested row does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Any other store failure.
    #[error("store failure: {0}")]
    Internal(String),
}

/// Synchronous-per-call persistence operations consumed by the session core.
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Create a room row, optionally associated with an external deck.
    async fn create_room(&self, deck_id: Option<String>) -> Result<RoomRecord, StoreError>;

    /// Fetch a room row by id.
    async fn get_room(&self, room_id: Uuid) -> Result<RoomRecord, StoreError>;

    /// List every room row.
    async fn list_rooms(&self) -> Result<Vec<RoomRecord>, StoreError>;

    /// List the ids of players currently joined to a room.
    async fn list_players(&self, room_id: Uuid) -> Result<Vec<Uuid>, StoreError>;

    /// Create a player row scoped to a room, returning its id.
    async fn create_player(&self, name: &str, room_id: Uuid) -> Result<Uuid, StoreError>;

    /// Persist a player's join order.
    async fn set_join_order(&self, player_id: Uuid, order: i32) -> Result<(), StoreError>;

    /// Remove a player row, returning the owning room id as confirmation.
    async fn remove_player(&self, player_id: Uuid) -> Result<Uuid, StoreError>;

    /// Delete a room row. Deleting an already-deleted room is not an error.
    async fn delete_room(&self, room_id: Uuid) -> Result<(), StoreError>;
}
