//! Card Room Server
//!
//! Binary entry point: wires the in-memory store, session registry and
//! token keys into the router and serves until interrupted.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use card_room::deck::DeckClient;
use card_room::network::{router, AppState, SessionRegistry, TokenKeys};
use card_room::store::MemoryStore;
use card_room::{ServerConfig, VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    info!("Card Room Server v{}", VERSION);

    let deck = config
        .deck_api_url
        .as_deref()
        .map(|url| Arc::new(DeckClient::new(url)));
    if deck.is_none() {
        info!("deck API disabled, rooms will be created without decks");
    }

    let state = AppState {
        store: Arc::new(MemoryStore::new()),
        registry: Arc::new(SessionRegistry::new()),
        keys: Arc::new(TokenKeys::new(&config.token_secret)),
        deck,
    };

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
