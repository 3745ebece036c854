//! Order aggregate: the order record, its line items, and the total
//! invariant.

use chrono::{DateTime, Utc};
use common::{ItemId, OrderId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::money::Money;
use crate::status::OrderStatus;

/// A purchase aggregate owned by one user.
///
/// The total has two setting paths: at creation the caller supplies it
/// directly (legacy behavior, nothing backs it yet), and after every
/// item mutation it is overwritten with [`recompute_total`] over the
/// full item set. The invariant `total == sum(item.subtotal)` holds
/// whenever at least one item exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub owner_id: UserId,
    pub status: OrderStatus,
    pub total: Money,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Creates a pending order with a caller-supplied initial total.
    pub fn create(owner_id: UserId, initial_total: Money) -> Result<Self, DomainError> {
        if !initial_total.is_positive() {
            return Err(DomainError::InvalidTotal);
        }

        Ok(Self {
            id: OrderId::new(),
            owner_id,
            status: OrderStatus::Pending,
            total: initial_total,
            created_at: Utc::now(),
        })
    }

    /// Returns an error unless items may currently be added or removed.
    pub fn ensure_modifiable(&self) -> Result<(), DomainError> {
        if self.status.allows_item_changes() {
            Ok(())
        } else {
            Err(DomainError::NotModifiable {
                status: self.status,
            })
        }
    }
}

/// A line entry within an order.
///
/// The subtotal is always `quantity * unit_price`, computed on the
/// server; clients never supply it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: ItemId,
    pub order_id: OrderId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub subtotal: Money,
}

/// A validated item that has not been attached to an order yet.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub subtotal: Money,
}

impl NewOrderItem {
    /// Validates the item fields and computes the subtotal.
    pub fn new(
        product_name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Result<Self, DomainError> {
        if quantity < 1 {
            return Err(DomainError::InvalidQuantity { quantity });
        }
        if !unit_price.is_positive() {
            return Err(DomainError::InvalidUnitPrice);
        }

        Ok(Self {
            product_name: product_name.into(),
            quantity,
            unit_price,
            subtotal: unit_price.multiply(quantity),
        })
    }

    /// Attaches the item to an order, assigning a fresh item ID.
    pub fn into_item(self, order_id: OrderId) -> OrderItem {
        OrderItem {
            id: ItemId::new(),
            order_id,
            product_name: self.product_name,
            quantity: self.quantity,
            unit_price: self.unit_price,
            subtotal: self.subtotal,
        }
    }
}

/// Authoritative order total: a full sum over the current item set.
///
/// Deliberately not incremental. Adding and subtracting deltas would
/// let rounding drift accumulate across mutations; summing the stored
/// subtotals cannot.
pub fn recompute_total(items: &[OrderItem]) -> Money {
    items
        .iter()
        .fold(Money::zero(), |total, item| total + item.subtotal)
}
