//! Server Configuration

use std::net::SocketAddr;

/// Runtime configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// HS256 secret for session tokens.
    pub token_secret: String,
    /// Deck API base URL; `None` disables deck draws.
    pub deck_api_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".parse().unwrap(),
            token_secret: "card-room-dev-secret".to_string(),
            deck_api_url: Some(crate::deck::DEFAULT_BASE_URL.to_string()),
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables, falling back to defaults.
    /// Set `CARD_ROOM_DECK_API` to an empty string to disable deck draws.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: std::env::var("CARD_ROOM_ADDR")
                .ok()
                .and_then(|addr| addr.parse().ok())
                .unwrap_or(defaults.bind_addr),
            token_secret: std::env::var("CARD_ROOM_TOKEN_SECRET")
                .unwrap_or(defaults.token_secret),
            deck_api_url: match std::env::var("CARD_ROOM_DECK_API") {
                Ok(url) if url.is_empty() => None,
                Ok(url) => Some(url),
                Err(_) => defaults.deck_api_url,
            },
        }
    }
}
