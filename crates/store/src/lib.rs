//! Storage layer for users, orders, and line items.
//!
//! The [`Store`] trait is the transactional boundary of the system:
//! item mutations and the order-total recompute are one atomic unit,
//! so observers see either the fully-prior or the fully-updated state.
//! Two implementations are provided: [`PgStore`] backed by PostgreSQL
//! and [`MemoryStore`] for tests and local runs.

mod memory;
mod postgres;

use async_trait::async_trait;
use common::{ItemId, OrderId, UserId};
use domain::{DomainError, NewOrderItem, Order, OrderItem, User};
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors that can occur when interacting with the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No order with the given ID exists.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// The item does not belong to the given order.
    #[error("item {item_id} not found in order {order_id}")]
    ItemNotFound { order_id: OrderId, item_id: ItemId },

    /// The email address is already registered.
    #[error("email already registered: {0}")]
    EmailTaken(String),

    /// A domain rule was violated while the row set was locked.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored row could not be mapped back to a domain value.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Transactional persistence for users, orders, and items.
///
/// Contract for `add_item` and `remove_item`: the item write and the
/// full-set total recompute execute in one transaction, with the
/// parent order row locked for its duration. The status guard
/// (no item changes on delivered/canceled orders) and item membership
/// are re-evaluated under that lock.
#[async_trait]
pub trait Store: Send + Sync {
    // -- Users --

    /// Persists a new user. Fails with [`StoreError::EmailTaken`] if
    /// the email is already registered.
    async fn create_user(&self, user: User) -> Result<User>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>>;

    // -- Orders --

    async fn create_order(&self, order: Order) -> Result<Order>;

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>>;

    async fn list_orders_by_owner(&self, owner_id: UserId) -> Result<Vec<Order>>;

    async fn list_all_orders(&self) -> Result<Vec<Order>>;

    /// Applies the finalize transition under the order row lock.
    async fn finalize_order(&self, id: OrderId) -> Result<Order>;

    /// Applies the cancel transition (soft delete) under the order row
    /// lock.
    async fn cancel_order(&self, id: OrderId) -> Result<Order>;

    // -- Items --

    /// Inserts the item and recomputes the order total atomically.
    async fn add_item(&self, order_id: OrderId, item: NewOrderItem) -> Result<OrderItem>;

    /// Deletes the item and recomputes the order total atomically.
    /// Returns a snapshot of the removed item captured before the
    /// deletion.
    async fn remove_item(&self, order_id: OrderId, item_id: ItemId) -> Result<OrderItem>;

    async fn list_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>>;
}
