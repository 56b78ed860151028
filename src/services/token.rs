//! Session tokens
//!
//! Stateless bearer tokens: HS256-signed JWTs carrying the subject id,
//! email, and admin flag. There is no server-side session table and no
//! revocation list; a token stays valid until its natural expiry even if
//! account state changes. That trade-off buys session verification
//! without a store round-trip and is a documented limitation.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::User;

/// Claims embedded in every token issued by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Standard JWT subject, set to the user id as a string.
    pub sub: String,

    /// Email address at issuance time.
    pub email: String,

    /// Admin flag at issuance time. A promoted or demoted user must log
    /// in again for this to change.
    pub is_admin: bool,

    /// Issued-at (Unix timestamp, seconds).
    pub iat: i64,

    /// Expiry (Unix timestamp, seconds).
    pub exp: i64,
}

impl Claims {
    /// Parse the subject back into a user id
    pub fn subject_id(&self) -> Result<i64> {
        self.sub
            .parse::<i64>()
            .with_context(|| format!("Invalid token subject: {}", self.sub))
    }
}

/// Issues and verifies session tokens.
///
/// Holds the signing secret and token lifetime, both resolved from
/// configuration at startup.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service with the given secret and lifetime
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    /// Issue a signed token for the given user
    pub fn issue(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            is_admin: user.is_admin,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .context("Failed to sign session token")
    }

    /// Verify a token's signature and expiry, returning its claims.
    ///
    /// Fails on malformed tokens, bad signatures, and expired tokens.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        // Expired means expired: no clock leeway on exp
        let mut validation = Validation::default();
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .context("Invalid session token")?;

        Ok(data.claims)
    }
}
