//! Deck API Client
//!
//! Thin client for the external deck-drawing HTTP service. Rooms draw a
//! fresh shuffled deck at creation; card draws happen against that deck id.
//! Any failure here is opaque to callers and surfaces as an internal error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Production base URL of the deck service.
pub const DEFAULT_BASE_URL: &str = "https://www.deckofcardsapi.com/api/deck";

/// The 40-card deck used by the game: 8s, 9s and 10s removed.
const DECK_CARDS: &str = "AS,KS,QS,JS,7S,6S,5S,4S,3S,2S,\
AD,KD,QD,JD,7D,6D,5D,4D,3D,2D,\
AC,KC,QC,JC,7C,6C,5C,4C,3C,2C,\
AH,KH,QH,JH,7H,6H,5H,4H,3H,2H";

/// Deck API failures.
#[derive(Debug, Error)]
pub enum DeckError {
    /// Transport-level failure or non-success HTTP status.
    #[error("deck api request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered but refused the operation.
    #[error("deck api refused the request")]
    Refused,
}

/// A remote deck handle.
#[derive(Debug, Clone)]
pub struct Deck {
    /// Identifier to draw against.
    pub deck_id: String,
    /// Whether the service shuffled the deck.
    pub shuffled: bool,
    /// Cards left in the deck.
    pub remaining: i64,
}

/// A single drawn card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    /// Card code, e.g. `"AS"`.
    pub code: String,
    /// Card face image URL.
    pub image: String,
    /// Card value, e.g. `"ACE"`.
    pub value: String,
    /// Card suit, e.g. `"SPADES"`.
    pub suit: String,
}

#[derive(Deserialize)]
struct DeckResponse {
    success: bool,
    deck_id: String,
    remaining: i64,
    #[serde(default)]
    shuffled: bool,
}

#[derive(Deserialize)]
struct DrawResponse {
    success: bool,
    cards: Vec<Card>,
}

/// Client for the deck service.
pub struct DeckClient {
    http: reqwest::Client,
    base_url: String,
}

impl DeckClient {
    /// Create a client against the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Create and shuffle a fresh 40-card deck, returning its handle.
    pub async fn create_deck(&self) -> Result<Deck, DeckError> {
        let url = format!("{}/new/shuffle/?cards={}", self.base_url, DECK_CARDS);
        let response: DeckResponse = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if !response.success {
            return Err(DeckError::Refused);
        }
        Ok(Deck {
            deck_id: response.deck_id,
            shuffled: response.shuffled,
            remaining: response.remaining,
        })
    }

    /// Draw `count` cards from an existing deck.
    pub async fn draw_cards(&self, deck_id: &str, count: u32) -> Result<Vec<Card>, DeckError> {
        let url = format!("{}/{}/draw/?count={}", self.base_url, deck_id, count);
        let response: DrawResponse = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if !response.success {
            return Err(DeckError::Refused);
        }
        Ok(response.cards)
    }

    /// Fetch the current state of an existing deck.
    pub async fn deck_state(&self, deck_id: &str) -> Result<Deck, DeckError> {
        let url = format!("{}/{}", self.base_url, deck_id);
        let response: DeckResponse = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if !response.success {
            return Err(DeckError::Refused);
        }
        Ok(Deck {
            deck_id: response.deck_id,
            shuffled: response.shuffled,
            remaining: response.remaining,
        })
    }
}
