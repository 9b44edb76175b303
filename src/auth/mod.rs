pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use password::{PasswordError, PasswordHasher};

/// Claims carried by every issued token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    #[serde(default)]
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("Invalid token expiry: {0} hours")]
    InvalidExpiry(u64),

    #[error("Token expiry overflows the clock")]
    ExpiryOverflow,

    #[error("JWT generation error: {0}")]
    Generation(#[source] jsonwebtoken::errors::Error),

    #[error("Invalid JWT token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Signing and verification keys derived from the process-wide secret.
///
/// Built once at startup. Replacing the secret (and restarting) invalidates
/// every token issued under the old one; there is no overlap window.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    expiry: Option<Duration>,
}

impl TokenKeys {
    pub fn new(secret: &str, expiry_hours: Option<u64>) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::InvalidSecret);
        }

        let expiry = match expiry_hours {
            None => None,
            Some(hours) => Some(
                i64::try_from(hours)
                    .ok()
                    .filter(|h| *h > 0)
                    .and_then(Duration::try_hours)
                    .ok_or(TokenError::InvalidExpiry(hours))?,
            ),
        };

        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        if expiry_hours.is_some() {
            validation.set_required_spec_claims(&["exp"]);
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiry,
        })
    }

    /// Sign a token for `username`
    pub fn issue(&self, username: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let exp = match self.expiry {
            Some(ttl) => Some(
                now.checked_add_signed(ttl)
                    .ok_or(TokenError::ExpiryOverflow)?
                    .timestamp(),
            ),
            None => None,
        };
        let claims = Claims {
            username: username.to_string(),
            iat: now.timestamp(),
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Generation)
    }

    /// Check the signature (and expiry, when configured) and return the claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}
