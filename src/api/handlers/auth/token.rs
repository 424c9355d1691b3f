//! Signed session tokens.
//!
//! Sessions are stateless: the server keeps no session records, so trust
//! derives entirely from the HS256 signature over the claims. Claims carry
//! one stable account identifier (`sub`) plus the email, and always include
//! an `exp` a fixed window ahead so the token itself bounds the session.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Account id as a string (JWT subject).
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Mints and verifies session tokens with a shared secret.
#[derive(Clone)]
pub struct SessionTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SessionTokens {
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Sign a session token for an account, valid for 24 hours.
    ///
    /// # Errors
    /// Returns an error if serialization or signing fails.
    pub fn mint(&self, user_id: Uuid, email: &str) -> anyhow::Result<String> {
        self.mint_with_ttl(user_id, email, Duration::hours(SESSION_TTL_HOURS))
    }

    pub(crate) fn mint_with_ttl(
        &self,
        user_id: Uuid,
        email: &str,
        ttl: Duration,
    ) -> anyhow::Result<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key).map_err(Into::into)
    }

    /// Verify a token's signature and expiry, returning its claims.
    ///
    /// Forged, malformed, and expired tokens all answer `None`; callers
    /// treat that uniformly as "no session".
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<SessionClaims> {
        decode::<SessionClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .ok()
    }

    /// The subject parsed back into an account id, if the token is valid.
    #[must_use]
    pub fn verify_subject(&self, token: &str) -> Option<(Uuid, String)> {
        let claims = self.verify(token)?;
        let user_id = Uuid::parse_str(&claims.sub).ok()?;
        Some((user_id, claims.email))
    }
}
