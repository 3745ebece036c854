//! Service-boundary error taxonomy.
//!
//! Every business failure is folded into one of these variants at the
//! service layer; the API maps them to stable status codes. Storage
//! and other unexpected failures become [`ServiceError::Internal`]
//! with a generic message so internals never leak to clients.

use domain::DomainError;
use store::StoreError;
use thiserror::Error;

/// Errors surfaced by the account and order services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Bad input shape or range.
    #[error("{0}")]
    Validation(String),

    /// Resource absent, or an empty listing under current semantics.
    #[error("{0}")]
    NotFound(String),

    /// Caller is neither owner nor admin.
    #[error("{0}")]
    Forbidden(String),

    /// Illegal state transition or uniqueness conflict.
    #[error("{0}")]
    Conflict(String),

    /// Item mutation on a terminal-status order; surfaces as conflict.
    #[error("{0}")]
    NotModifiable(String),

    /// Missing, invalid, or wrong-class credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Unexpected failure; details stay in the logs.
    #[error("internal server error")]
    Internal,
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidAmount { .. }
            | DomainError::InvalidQuantity { .. }
            | DomainError::InvalidUnitPrice
            | DomainError::InvalidTotal => ServiceError::Validation(err.to_string()),
            DomainError::NotModifiable { .. } => ServiceError::NotModifiable(err.to_string()),
            DomainError::FinalizeCanceled | DomainError::AlreadyFinalized => {
                ServiceError::Conflict(err.to_string())
            }
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::OrderNotFound(_) => ServiceError::NotFound("order not found".to_string()),
            StoreError::ItemNotFound { .. } => {
                ServiceError::NotFound("order item not found".to_string())
            }
            StoreError::EmailTaken(email) => {
                ServiceError::Conflict(format!("email already registered: {email}"))
            }
            StoreError::Domain(domain_err) => domain_err.into(),
            StoreError::Database(_) | StoreError::Migration(_) | StoreError::Corrupt(_) => {
                tracing::error!(error = %err, "storage failure");
                ServiceError::Internal
            }
        }
    }
}
