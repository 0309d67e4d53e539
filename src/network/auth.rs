//! Session Token Authentication
//!
//! Issues and verifies the signed session tokens handed out at room entry.
//! Signature verification is the trusted boundary; the claims mapping comes
//! back untyped and is type-checked here, once, into [`RoomClaims`]. Every
//! connect/start request must pass [`RoomClaims::authorize`] before any
//! registry mutation happens.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Validated identity claims carried by a session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomClaims {
    /// The room the token was issued for.
    pub room_id: Uuid,
    /// The player the token was issued to.
    pub player_id: Uuid,
    /// Join order assigned at room entry.
    pub order: i32,
}

impl RoomClaims {
    /// Type-check an untyped claims mapping into [`RoomClaims`].
    fn from_value(value: &Value) -> Result<Self, AuthError> {
        Ok(Self {
            room_id: claim_uuid(value, "room_id")?,
            player_id: claim_uuid(value, "player_id")?,
            order: value
                .get("order")
                .and_then(Value::as_i64)
                .ok_or(AuthError::MalformedClaims("order"))? as i32,
        })
    }

    /// Require that this token was issued for the room named in the request
    /// path. Fails with [`AuthError::RoomMismatch`] otherwise.
    pub fn authorize(&self, path_room_id: Uuid) -> Result<(), AuthError> {
        if self.room_id != path_room_id {
            return Err(AuthError::RoomMismatch);
        }
        Ok(())
    }
}

fn claim_uuid(value: &Value, name: &'static str) -> Result<Uuid, AuthError> {
    let raw = value
        .get(name)
        .and_then(Value::as_str)
        .ok_or(AuthError::MalformedClaims(name))?;
    Uuid::parse_str(raw).map_err(|_| AuthError::MalformedClaims(name))
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No token was supplied with the request.
    #[error("missing session token")]
    MissingToken,
    /// Token signature or format is invalid.
    #[error("invalid session token")]
    InvalidToken,
    /// A required claim is missing or not a well-formed identifier.
    #[error("malformed claim: {0}")]
    MalformedClaims(&'static str),
    /// Token's room claim does not match the requested room.
    #[error("token was issued for a different room")]
    RoomMismatch,
    /// The claimed player is not a member of the room.
    #[error("player is not in this room")]
    NotInRoom,
    /// Token could not be signed.
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// HS256 key pair used to issue and verify session tokens.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenKeys {
    /// Build keys from a shared secret.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Session tokens carry no registered claims; they live exactly as
        // long as the room membership they encode.
        validation.required_spec_claims = std::collections::HashSet::new();
        validation.validate_exp = false;
        validation.validate_aud = false;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issue a signed session token embedding the given claims.
    pub fn issue(&self, claims: &RoomClaims) -> Result<String, AuthError> {
        let payload = serde_json::json!({
            "room_id": claims.room_id.to_string(),
            "player_id": claims.player_id.to_string(),
            "order": claims.order,
        });
        encode(&Header::new(Algorithm::HS256), &payload, &self.encoding)
            .map_err(|err| AuthError::Signing(err.to_string()))
    }

    /// Verify a token's signature and extract typed claims.
    pub fn verify(&self, token: &str) -> Result<RoomClaims, AuthError> {
        let data = decode::<Value>(token, &self.decoding, &self.validation)
            .map_err(|_| AuthError::InvalidToken)?;
        RoomClaims::from_value(&data.claims)
    }
}
