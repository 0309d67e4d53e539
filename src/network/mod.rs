//! Network Layer
//!
//! Real-time session core: token auth, the live-connection registry with
//! broadcast fan-out, per-connection receive loops, the room lifecycle
//! cascade, and the HTTP/WebSocket surface in front of them.

pub mod auth;
pub mod connection;
pub mod handlers;
pub mod lifecycle;
pub mod protocol;
pub mod registry;

pub use auth::{AuthError, RoomClaims, TokenKeys};
pub use handlers::{router, AppState};
pub use lifecycle::JoinedRoom;
pub use protocol::{Event, EventType};
pub use registry::{ConnId, SessionRegistry};
