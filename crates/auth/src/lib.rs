//! Authentication primitives: password hashing and bearer tokens.
//!
//! The rest of the system treats both as opaque capabilities — it only
//! consumes "this password matches" and "this token belongs to user X
//! and is of class Y" facts.

pub mod password;
pub mod token;

use thiserror::Error;

pub use token::{Claims, TokenIssuer, TokenPair, TokenType};

/// Errors from the authentication primitives.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Token failed signature, expiry, or structural validation.
    #[error("invalid token")]
    InvalidToken,

    /// Token is valid but of the wrong class (access vs refresh).
    #[error("wrong token type")]
    WrongTokenType,

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    Hash(String),

    /// Token encoding failed.
    #[error("token encoding failed: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),
}
