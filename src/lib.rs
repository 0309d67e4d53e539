//! # Card Room Server
//!
//! Real-time session server for multiplayer card rooms: players join a
//! room over HTTP, open a WebSocket, and receive broadcast events about
//! room state changes.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      CARD ROOM SERVER                         │
//! ├──────────────────────────────────────────────────────────────┤
//! │  network/          - Session core                             │
//! │  ├── auth.rs       - Session token issue/verify (AuthGate)    │
//! │  ├── registry.rs   - Live-connection registry + broadcast     │
//! │  ├── connection.rs - Per-connection receive loop              │
//! │  ├── lifecycle.rs  - Join order + disconnect cascade          │
//! │  ├── protocol.rs   - Event envelope wire format               │
//! │  └── handlers.rs   - HTTP routes and WebSocket upgrade        │
//! │                                                               │
//! │  store/            - Persistence boundary                     │
//! │  ├── mod.rs        - RoomStore trait                          │
//! │  └── memory.rs     - In-memory implementation                 │
//! │                                                               │
//! │  deck.rs           - External deck-drawing API client         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The registry is the only shared mutable state: one exclusive lock over
//! the room-id -> connection-set map, held for the full duration of every
//! register, unregister and broadcast. Store calls always happen outside
//! that lock.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod deck;
pub mod error;
pub mod network;
pub mod store;

// Re-export commonly used types
pub use config::ServerConfig;
pub use error::ApiError;
pub use network::{router, AppState, Event, EventType, SessionRegistry, TokenKeys};
pub use store::{MemoryStore, RoomStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
