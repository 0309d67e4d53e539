//! Room Lifecycle
//!
//! Join-order assignment at room entry and the cascading teardown at
//! disconnect. A room moves `Created` (persisted, no connections) ->
//! `Active` (>=1 connection) -> `Closed` (zero connections and zero
//! persisted players; record deleted). Only the disconnect cascade drives
//! the final transition.

use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::network::auth::{RoomClaims, TokenKeys};
use crate::network::registry::{ConnId, SessionRegistry};
use crate::store::RoomStore;

/// Result of a successful room entry.
#[derive(Debug, Clone)]
pub struct JoinedRoom {
    /// Signed session token embedding (player, room, order).
    pub token: String,
    /// Join order assigned to this player.
    pub order: i32,
}

/// Enter a room: create the player row, assign a join order, and issue the
/// session token.
///
/// The order is the count of already-joined players at call time; two
/// strictly sequential joins on a fresh room yield 0 then 1. Concurrent
/// joins can race to the same value; a store-side sequence would fix that
/// and is deliberately not done here.
pub async fn join_room(
    store: &dyn RoomStore,
    keys: &TokenKeys,
    room_id: Uuid,
    name: &str,
) -> Result<JoinedRoom, ApiError> {
    store.get_room(room_id).await?;

    let order = store.list_players(room_id).await?.len() as i32;
    let player_id = store.create_player(name, room_id).await?;
    store.set_join_order(player_id, order).await?;

    let token = keys.issue(&RoomClaims {
        room_id,
        player_id,
        order,
    })?;

    info!(%room_id, %player_id, order, "player joined room");
    Ok(JoinedRoom { token, order })
}

/// Tear down one connection, invoked from its receive loop on exit.
///
/// Steps run sequentially, best-effort, with no retries: unregister the
/// connection, remove the player row (the store confirms the owning room,
/// defending against stale callers), then delete the room record and its
/// registry bucket once the store reports zero remaining players. Registry
/// connection count alone is never taken as evidence the room is empty.
///
/// The unregister result gates the cascade, so a read error racing a failed
/// broadcast write runs the store cleanup at most once. A failure at any
/// later step is returned for the caller to log; the room record it may
/// orphan is a known gap, not silently reconciled.
pub async fn disconnect(
    registry: &SessionRegistry,
    store: &dyn RoomStore,
    room_id: Uuid,
    conn_id: ConnId,
    player_id: Uuid,
) -> Result<(), ApiError> {
    if !registry.unregister(room_id, conn_id).await {
        return Ok(());
    }
    info!(%room_id, %player_id, %conn_id, "client disconnected");

    let owning_room = store.remove_player(player_id).await?;
    let remaining = store.list_players(owning_room).await?.len();

    if remaining == 0 {
        store.delete_room(owning_room).await?;
        registry.remove_room(owning_room).await;
        info!(room_id = %owning_room, "last player left, room closed");
    }

    Ok(())
}
