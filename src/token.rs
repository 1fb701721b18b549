//! Manage json web tokens.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_LIFETIME: u64 = 60 * 60 * 24; // 24 hours.

/// Pieces of information asserted on a JWT.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: String,
    /// Username, carried for display purposes only.
    pub username: String,
    /// Identifies the time at which the JWT was issued.
    pub iat: u64,
    /// Identifies the expiration time on or after which the JWT must not
    /// be accepted for processing.
    pub exp: u64,
}

/// Why a token was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("expired token")]
    Expired,
    #[error("invalid token")]
    Malformed,
}

/// Manage JWT tokens.
///
/// The signing secret is injected at construction and held for the
/// process lifetime; rotating it invalidates every issued token.
#[derive(Clone)]
pub struct TokenManager {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: u64,
}

impl TokenManager {
    /// Create a new [`TokenManager`] instance.
    pub fn new(secret: &str, lifetime: u64) -> Self {
        Self {
            algorithm: Algorithm::HS256,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime,
        }
    }

    /// Create a new signed token.
    pub fn create(&self, user_id: &str, username: &str) -> Result<String> {
        let time = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        let claims = Claims {
            sub: user_id.to_owned(),
            username: username.to_owned(),
            iat: time,
            exp: time + self.lifetime,
        };

        Ok(encode(&Header::new(self.algorithm), &claims, &self.encoding_key)?)
    }

    /// Decode and check a token.
    ///
    /// Every failure other than a past `exp` is reported as
    /// [`TokenError::Malformed`].
    pub fn decode(&self, token: &str) -> std::result::Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        // The expiry boundary is exact.
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    TokenError::Expired
                },
                _ => TokenError::Malformed,
            })
    }
}
