//! Shared identifier types for the order-management system.

mod types;

pub use types::{ItemId, OrderId, UserId};
