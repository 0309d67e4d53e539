//! End-to-end session flow over real sockets: create a room, enter it,
//! connect, exercise the echo marker and the start broadcast, then verify
//! the disconnect cascade tears the room down.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio_tungstenite::tungstenite;

use card_room::network::{router, AppState, SessionRegistry, TokenKeys};
use card_room::store::MemoryStore;

async fn spawn_server() -> (SocketAddr, AppState) {
    let state = AppState {
        store: Arc::new(MemoryStore::new()),
        registry: Arc::new(SessionRegistry::new()),
        keys: Arc::new(TokenKeys::new("integration-secret")),
        deck: None,
    };
    let app = router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state)
}

/// Registration happens in the spawned upgrade task, so give it a moment.
async fn wait_for_room_size(state: &AppState, room_id: uuid::Uuid, expected: usize) {
    for _ in 0..50 {
        if state.registry.room_size(room_id).await == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!(
        "room {room_id} never reached {expected} connections (got {})",
        state.registry.room_size(room_id).await
    );
}

async fn create_room(http: &reqwest::Client, addr: SocketAddr) -> String {
    let room: Value = http
        .post(format!("http://{addr}/game"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    room["id"].as_str().unwrap().to_string()
}

async fn enter_room(http: &reqwest::Client, addr: SocketAddr, room_id: &str, name: &str) -> Value {
    http.patch(format!("http://{addr}/game/{room_id}/enter"))
        .json(&serde_json::json!({ "name": name }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn full_session_flow() {
    let (addr, state) = spawn_server().await;
    let http = reqwest::Client::new();

    let room_id = create_room(&http, addr).await;

    let joined = enter_room(&http, addr, &room_id, "alice").await;
    assert_eq!(joined["order"], 0);
    let token = joined["token"].as_str().unwrap().to_string();

    let (mut ws, _) = tokio_tungstenite::connect_async(format!(
        "ws://{addr}/game/{room_id}/connect?token={token}"
    ))
    .await
    .unwrap();

    let room_uuid = room_id.parse().unwrap();
    wait_for_room_size(&state, room_uuid, 1).await;

    // Legacy echo marker round-trips on the same connection.
    ws.send(tungstenite::Message::Text("echo: hello".into()))
        .await
        .unwrap();
    let reply = ws.next().await.unwrap().unwrap();
    assert_eq!(reply, tungstenite::Message::Text("echo: hello".into()));

    // Frames without the marker are swallowed; the next frame we observe
    // after starting the game must be the broadcast envelope.
    ws.send(tungstenite::Message::Text("just chatting".into()))
        .await
        .unwrap();

    let start: Value = http
        .patch(format!("http://{addr}/game/{room_id}/start"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(start["type"], 1);

    let event = loop {
        match ws.next().await.unwrap().unwrap() {
            tungstenite::Message::Binary(bytes) => {
                break serde_json::from_slice::<Value>(&bytes).unwrap()
            }
            tungstenite::Message::Text(_) => panic!("unexpected text frame"),
            _ => continue,
        }
    };
    assert_eq!(event["type"], 1);
    assert_eq!(event["message"], "c3RhcnQgZ2FtZQ==");

    // Closing the last connection cascades: player row removed, room
    // record deleted, registry bucket gone.
    ws.close(None).await.unwrap();
    for _ in 0..50 {
        let rooms: Value = http
            .get(format!("http://{addr}/game"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        if rooms.as_array().unwrap().is_empty() {
            assert_eq!(state.registry.room_size(room_uuid).await, 0);
            return;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("room was not deleted after the last disconnect");
}

#[tokio::test]
async fn non_last_disconnect_keeps_room_alive() {
    let (addr, state) = spawn_server().await;
    let http = reqwest::Client::new();

    let room_id = create_room(&http, addr).await;

    let alice = enter_room(&http, addr, &room_id, "alice").await;
    let bob = enter_room(&http, addr, &room_id, "bob").await;
    assert_eq!(alice["order"], 0);
    assert_eq!(bob["order"], 1);

    let alice_token = alice["token"].as_str().unwrap();
    let bob_token = bob["token"].as_str().unwrap();

    let (mut alice_ws, _) = tokio_tungstenite::connect_async(format!(
        "ws://{addr}/game/{room_id}/connect?token={alice_token}"
    ))
    .await
    .unwrap();
    let (_bob_ws, _) = tokio_tungstenite::connect_async(format!(
        "ws://{addr}/game/{room_id}/connect?token={bob_token}"
    ))
    .await
    .unwrap();

    let room_uuid = room_id.parse().unwrap();
    wait_for_room_size(&state, room_uuid, 2).await;

    alice_ws.close(None).await.unwrap();
    wait_for_room_size(&state, room_uuid, 1).await;

    // Bob's membership keeps the durable record alive.
    let rooms: Value = http
        .get(format!("http://{addr}/game"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(rooms.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn connect_with_foreign_room_token_is_rejected() {
    let (addr, state) = spawn_server().await;
    let http = reqwest::Client::new();

    let room_a = create_room(&http, addr).await;
    let room_b = create_room(&http, addr).await;

    let joined = enter_room(&http, addr, &room_a, "alice").await;
    let token = joined["token"].as_str().unwrap();

    let result = tokio_tungstenite::connect_async(format!(
        "ws://{addr}/game/{room_b}/connect?token={token}"
    ))
    .await;

    match result {
        Err(tungstenite::Error::Http(response)) => {
            assert_eq!(response.status(), 401);
        }
        other => panic!("expected HTTP rejection, got {other:?}"),
    }

    // Rejection happened before any registry mutation.
    assert_eq!(state.registry.room_size(room_a.parse().unwrap()).await, 0);
    assert_eq!(state.registry.room_size(room_b.parse().unwrap()).await, 0);
}

#[tokio::test]
async fn enter_unknown_room_is_not_found() {
    let (addr, _state) = spawn_server().await;
    let http = reqwest::Client::new();

    let response = http
        .patch(format!(
            "http://{addr}/game/{}/enter",
            uuid::Uuid::new_v4()
        ))
        .json(&serde_json::json!({ "name": "alice" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let response = http
        .patch(format!("http://{addr}/game/not-a-uuid/enter"))
        .json(&serde_json::json!({ "name": "alice" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}
