//! HS256 bearer tokens with access/refresh classes.

use chrono::{Duration, Utc};
use common::UserId;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AuthError;

/// Token class carried in the `type` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims embedded in every issued token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The user the token identifies.
    pub sub: String,

    /// Access or refresh.
    #[serde(rename = "type")]
    pub token_type: TokenType,

    /// Expiry as a unix timestamp.
    pub exp: i64,
}

/// An access/refresh token pair as returned by login and refresh.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues and verifies HS256 bearer tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    /// Creates an issuer with the given shared secret and TTLs.
    pub fn new(secret: &str, access_ttl_minutes: i64, refresh_ttl_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl: Duration::minutes(access_ttl_minutes),
            refresh_ttl: Duration::minutes(refresh_ttl_minutes),
        }
    }

    /// Issues a fresh access/refresh pair for the user.
    pub fn issue_pair(&self, user_id: UserId) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.issue(user_id, TokenType::Access, self.access_ttl)?,
            refresh_token: self.issue(user_id, TokenType::Refresh, self.refresh_ttl)?,
        })
    }

    fn issue(
        &self,
        user_id: UserId,
        token_type: TokenType,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user_id.to_string(),
            token_type,
            exp: (Utc::now() + ttl).timestamp(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Verifies signature, expiry, and token class, returning the user
    /// the token identifies.
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<UserId, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| AuthError::InvalidToken)?;

        if data.claims.token_type != expected {
            return Err(AuthError::WrongTokenType);
        }

        let uuid = Uuid::parse_str(&data.claims.sub).map_err(|_| AuthError::InvalidToken)?;
        Ok(UserId::from_uuid(uuid))
    }
}
