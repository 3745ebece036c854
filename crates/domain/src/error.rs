//! Domain error types.

use thiserror::Error;

use crate::status::OrderStatus;

/// Errors produced by domain rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// Amount could not be parsed as fixed-point decimal.
    #[error("invalid amount {input:?}: expected a decimal with at most two fractional digits")]
    InvalidAmount { input: String },

    /// Item quantity below the minimum.
    #[error("invalid quantity {quantity}: must be at least 1")]
    InvalidQuantity { quantity: u32 },

    /// Unit price must be strictly positive.
    #[error("invalid unit price: must be greater than zero")]
    InvalidUnitPrice,

    /// Order total supplied at creation must be strictly positive.
    #[error("invalid order total: must be greater than zero")]
    InvalidTotal,

    /// Item mutation attempted on an order in a terminal status.
    #[error("cannot modify items of a {status} order")]
    NotModifiable { status: OrderStatus },

    /// Finalize attempted on a canceled order.
    #[error("cannot finalize a canceled order")]
    FinalizeCanceled,

    /// Finalize attempted on an already delivered order.
    #[error("already finalized")]
    AlreadyFinalized,
}
