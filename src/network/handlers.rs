//! HTTP + WebSocket Handlers
//!
//! The transport surface: room creation and listing, room entry, the
//! WebSocket upgrade, and the start-game broadcast. Handlers validate and
//! authorize fully before touching the registry; auth failures never leave
//! partial registrations behind.

use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::deck::DeckClient;
use crate::error::ApiError;
use crate::network::auth::{AuthError, RoomClaims, TokenKeys};
use crate::network::connection::run_connection;
use crate::network::lifecycle;
use crate::network::protocol::{base64_bytes, Event, EventType};
use crate::network::registry::SessionRegistry;
use crate::store::RoomStore;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Durable room/player store.
    pub store: Arc<dyn RoomStore>,
    /// Live-connection registry.
    pub registry: Arc<SessionRegistry>,
    /// Session token keys.
    pub keys: Arc<TokenKeys>,
    /// Deck API client; `None` disables deck draws at room creation.
    pub deck: Option<Arc<DeckClient>>,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/game", post(create_room).get(list_rooms))
        .route("/game/:game_id/enter", patch(enter_room))
        .route("/game/:game_id/connect", get(connect_room))
        .route("/game/:game_id/start", patch(start_room))
        .with_state(state)
}

fn parse_room_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation("invalid room id".into()))
}

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Pull the session token from the Authorization header, falling back to
/// the `token` query parameter (browser WebSocket clients cannot set
/// headers on the upgrade request).
fn extract_token(headers: &HeaderMap, query: &TokenQuery) -> Result<String, ApiError> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let value = value
            .to_str()
            .map_err(|_| ApiError::Auth(AuthError::InvalidToken))?;
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Ok(token.to_string());
        }
    }
    query
        .token
        .clone()
        .ok_or(ApiError::Auth(AuthError::MissingToken))
}

/// Verify the token, match its room claim against the path room, and check
/// the claimed player is still a member. Completes before any registry
/// mutation for connect and start.
async fn authorize_request(
    state: &AppState,
    room_id: Uuid,
    headers: &HeaderMap,
    query: &TokenQuery,
) -> Result<RoomClaims, ApiError> {
    let token = extract_token(headers, query)?;
    let claims = state.keys.verify(&token)?;
    claims.authorize(room_id)?;

    state.store.get_room(room_id).await?;
    let players = state.store.list_players(room_id).await?;
    if !players.contains(&claims.player_id) {
        return Err(ApiError::Auth(AuthError::NotInRoom));
    }
    Ok(claims)
}

#[derive(Serialize)]
struct RoomResponse {
    id: Uuid,
    created_at: DateTime<Utc>,
    state: String,
    round: i32,
    #[serde(with = "base64_bytes")]
    result: Vec<u8>,
}

async fn create_room(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let deck_id = match &state.deck {
        Some(deck) => Some(deck.create_deck().await?.deck_id),
        None => None,
    };

    let room = state.store.create_room(deck_id).await?;
    info!(room_id = %room.id, "room created");

    Ok(Json(RoomResponse {
        id: room.id,
        created_at: room.created_at,
        state: room.state,
        round: room.round,
        result: room.result,
    }))
}

#[derive(Serialize)]
struct RoomSummary {
    id: Uuid,
}

async fn list_rooms(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rooms = state.store.list_rooms().await?;
    let summaries: Vec<RoomSummary> = rooms
        .into_iter()
        .map(|room| RoomSummary { id: room.id })
        .collect();
    Ok(Json(summaries))
}

#[derive(Deserialize)]
struct EnterRoomRequest {
    name: String,
}

#[derive(Serialize)]
struct EnterRoomResponse {
    token: String,
    order: i32,
}

async fn enter_room(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(body): Json<EnterRoomRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let room_id = parse_room_id(&game_id)?;
    if body.name.trim().is_empty() {
        return Err(ApiError::Validation("name must not be empty".into()));
    }

    let joined = lifecycle::join_room(&*state.store, &state.keys, room_id, &body.name).await?;
    Ok(Json(EnterRoomResponse {
        token: joined.token,
        order: joined.order,
    }))
}

async fn connect_room(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let room_id = parse_room_id(&game_id)?;
    let claims = authorize_request(&state, room_id, &headers, &query).await?;

    let player_id = claims.player_id;
    Ok(ws.on_upgrade(move |socket| run_connection(state, socket, room_id, player_id)))
}

async fn start_room(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let room_id = parse_room_id(&game_id)?;
    let claims = authorize_request(&state, room_id, &headers, &query).await?;

    let event = Event::new(EventType::StartGame, b"start game".to_vec());
    info!(%room_id, player_id = %claims.player_id, "starting game");

    // Fan-out runs off the request path; the caller gets the envelope back
    // immediately.
    let registry = state.registry.clone();
    let broadcast = event.clone();
    tokio::spawn(async move {
        registry.broadcast(room_id, &broadcast).await;
    });

    Ok(Json(event))
}
