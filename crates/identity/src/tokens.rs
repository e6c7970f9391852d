//! Token issuance and verification
//!
//! This module issues HS256 JWTs carrying an authenticated user id and
//! verifies them on the way back in. The signing secret and token
//! lifetime are explicit configuration passed at construction time.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token error types
#[derive(Debug, Error)]
pub enum TokenError {
    /// JWT encode/decode error
    #[error("Token error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Token carried no subject
    #[error("Token has no subject")]
    MissingSubject,
}

/// Result type for token operations
pub type Result<T> = std::result::Result<T, TokenError>;

/// JWT claims carried by an issued token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (the authenticated user id)
    pub sub: String,
    /// Issued-at timestamp (seconds since epoch)
    pub iat: i64,
    /// Expiry timestamp (seconds since epoch)
    pub exp: i64,
}

/// Token issuer configuration
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC signing secret
    pub secret: String,
    /// Token lifetime
    pub ttl: Duration,
}

impl TokenConfig {
    /// Create a configuration with the default 7-day lifetime
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into(), ttl: Duration::days(7) }
    }

    /// Set the token lifetime
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Issues and verifies signed user-id tokens
///
/// # Example
///
/// ```rust
/// use identity::tokens::{TokenConfig, TokenIssuer};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let issuer = TokenIssuer::new(TokenConfig::new("secret"));
/// let token = issuer.issue("user-123")?;
/// assert_eq!(issuer.verify(&token)?, "user-123");
/// # Ok(())
/// # }
/// ```
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    /// Create a new token issuer
    pub fn new(config: TokenConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl: config.ttl,
        }
    }

    /// Issue a token for the given user id
    pub fn issue(&self, user_id: &str) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// Verify a token and return the user id it carries
    ///
    /// # Errors
    ///
    /// - `TokenError::Jwt` - invalid signature, malformed token, or
    ///   expired claims
    /// - `TokenError::MissingSubject` - structurally valid token with an
    ///   empty subject
    pub fn verify(&self, token: &str) -> Result<String> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;

        if data.claims.sub.is_empty() {
            return Err(TokenError::MissingSubject);
        }

        Ok(data.claims.sub)
    }
}
