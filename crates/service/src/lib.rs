//! Orchestration layer for the order-management system.
//!
//! Wraps the domain rules and the store with authorization, existence
//! checks, and the service-boundary error taxonomy the API maps to
//! status codes.

pub mod accounts;
pub mod error;
pub mod orders;

pub use accounts::AccountService;
pub use error::ServiceError;
pub use orders::OrderService;
