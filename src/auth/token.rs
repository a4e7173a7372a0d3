//! Access token issuance and verification for STASH.
//!
//! Tokens are HMAC-signed JWTs. The subject claim carries the username,
//! which is all the hosting core needs to resolve an actor.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Token-related errors.
#[derive(Error, Debug)]
pub enum TokenError {
    /// Token could not be encoded.
    #[error("token encoding failed: {0}")]
    Encode(String),

    /// Token is malformed, expired, or has a bad signature.
    #[error("invalid or expired token")]
    Invalid,
}

/// JWT claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the username.
    pub sub: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: u64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: u64,
    /// Unique token ID.
    pub jti: String,
}

/// Issues and verifies access tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry_secs: u64,
}

impl TokenIssuer {
    /// Create a new issuer from a secret key.
    pub fn new(secret: &str, expiry_secs: u64) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiry_secs,
        }
    }

    /// Issue a token for the given identity.
    pub fn issue(&self, username: &str) -> Result<String, TokenError> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = Claims {
            sub: username.to_string(),
            iat: now,
            exp: now + self.expiry_secs,
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    /// Verify a token and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Invalid)
    }
}
