//! In-memory RoomStore
//!
//! HashMap-backed implementation of the persistence boundary. Used by the
//! test suite and by standalone runs without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{PlayerRecord, RoomRecord, RoomStore, StoreError};

#[derive(Default)]
struct Inner {
    rooms: HashMap<Uuid, RoomRecord>,
    players: HashMap<Uuid, PlayerRecord>,
}

/// In-memory [`RoomStore`] implementation.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomStore for MemoryStore {
    async fn create_room(&self, deck_id: Option<String>) -> Result<RoomRecord, StoreError> {
        let record = RoomRecord {
            id: Uuid::new_v4(),
            state: "waiting".to_string(),
            round: 0,
            result: Vec::new(),
            deck_id,
            created_at: Utc::now(),
        };
        let mut inner = self.inner.write().await;
        inner.rooms.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_room(&self, room_id: Uuid) -> Result<RoomRecord, StoreError> {
        let inner = self.inner.read().await;
        inner
            .rooms
            .get(&room_id)
            .cloned()
            .ok_or(StoreError::NotFound("room"))
    }

    async fn list_rooms(&self) -> Result<Vec<RoomRecord>, StoreError> {
        let inner = self.inner.read().await;
        let mut rooms: Vec<RoomRecord> = inner.rooms.values().cloned().collect();
        rooms.sort_by_key(|room| room.created_at);
        Ok(rooms)
    }

    async fn list_players(&self, room_id: Uuid) -> Result<Vec<Uuid>, StoreError> {
        let inner = self.inner.read().await;
        let mut players: Vec<&PlayerRecord> = inner
            .players
            .values()
            .filter(|player| player.room_id == room_id)
            .collect();
        players.sort_by_key(|player| (player.join_order, player.id));
        Ok(players.into_iter().map(|player| player.id).collect())
    }

    async fn create_player(&self, name: &str, room_id: Uuid) -> Result<Uuid, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.rooms.contains_key(&room_id) {
            return Err(StoreError::NotFound("room"));
        }
        let record = PlayerRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            room_id,
            join_order: 0,
        };
        let player_id = record.id;
        inner.players.insert(player_id, record);
        Ok(player_id)
    }

    async fn set_join_order(&self, player_id: Uuid, order: i32) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let player = inner
            .players
            .get_mut(&player_id)
            .ok_or(StoreError::NotFound("player"))?;
        player.join_order = order;
        Ok(())
    }

    async fn remove_player(&self, player_id: Uuid) -> Result<Uuid, StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .players
            .remove(&player_id)
            .map(|player| player.room_id)
            .ok_or(StoreError::NotFound("player"))
    }

    async fn delete_room(&self, room_id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.rooms.remove(&room_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get_room() {
        let store = MemoryStore::new();
        let room = store.create_room(Some("deck-1".into())).await.unwrap();
        assert_eq!(room.state, "waiting");
        assert_eq!(room.round, 0);

        let fetched = store.get_room(room.id).await.unwrap();
        assert_eq!(fetched.id, room.id);
        assert_eq!(fetched.deck_id.as_deref(), Some("deck-1"));
    }

    #[tokio::test]
    async fn test_get_missing_room_is_not_found() {
        let store = MemoryStore::new();
        let result = store.get_room(Uuid::new_v4()).await;
        assert!(matches!(result, Err(StoreError::NotFound("room"))));
    }

    #[tokio::test]
    async fn test_players_scoped_to_room() {
        let store = MemoryStore::new();
        let room_a = store.create_room(None).await.unwrap();
        let room_b = store.create_room(None).await.unwrap();

        let alice = store.create_player("alice", room_a.id).await.unwrap();
        store.create_player("bob", room_b.id).await.unwrap();

        let players = store.list_players(room_a.id).await.unwrap();
        assert_eq!(players, vec![alice]);
    }

    #[tokio::test]
    async fn test_create_player_requires_room() {
        let store = MemoryStore::new();
        let result = store.create_player("alice", Uuid::new_v4()).await;
        assert!(matches!(result, Err(StoreError::NotFound("room"))));
    }

    #[tokio::test]
    async fn test_remove_player_confirms_owning_room() {
        let store = MemoryStore::new();
        let room = store.create_room(None).await.unwrap();
        let player = store.create_player("alice", room.id).await.unwrap();

        let owning_room = store.remove_player(player).await.unwrap();
        assert_eq!(owning_room, room.id);

        let again = store.remove_player(player).await;
        assert!(matches!(again, Err(StoreError::NotFound("player"))));
    }

    #[tokio::test]
    async fn test_delete_room_is_idempotent() {
        let store = MemoryStore::new();
        let room = store.create_room(None).await.unwrap();
        store.delete_room(room.id).await.unwrap();
        store.delete_room(room.id).await.unwrap();
        assert!(store.list_rooms().await.unwrap().is_empty());
    }
}
