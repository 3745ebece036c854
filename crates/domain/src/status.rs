//! Order status state machine.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Lifecycle status of an order.
///
/// Transitions:
/// ```text
/// Pending ──► Delivered
///    │
///    └──► Canceled
/// ```
///
/// `Processing` is part of the stored enum for forward compatibility
/// but no current operation transitions into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Order accepted, items can still change.
    #[default]
    #[serde(rename = "pendente")]
    Pending,

    /// Reserved for future fulfilment flows; currently unreachable.
    #[serde(rename = "processando")]
    Processing,

    /// Order finalized and delivered (terminal).
    #[serde(rename = "entregue")]
    Delivered,

    /// Order canceled; the record is retained as a soft delete (terminal).
    #[serde(rename = "cancelado")]
    Canceled,
}

impl OrderStatus {
    /// Returns true if line items may be added or removed.
    pub fn allows_item_changes(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Processing)
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Canceled)
    }

    /// Transition to `Delivered`.
    pub fn finalize(self) -> Result<OrderStatus, DomainError> {
        match self {
            OrderStatus::Canceled => Err(DomainError::FinalizeCanceled),
            OrderStatus::Delivered => Err(DomainError::AlreadyFinalized),
            OrderStatus::Pending | OrderStatus::Processing => Ok(OrderStatus::Delivered),
        }
    }

    /// Transition to `Canceled`.
    ///
    /// Soft delete: the status flips and the record stays. Re-canceling
    /// is accepted and leaves the order canceled.
    pub fn cancel(self) -> OrderStatus {
        OrderStatus::Canceled
    }

    /// Returns the wire/storage representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pendente",
            OrderStatus::Processing => "processando",
            OrderStatus::Delivered => "entregue",
            OrderStatus::Canceled => "cancelado",
        }
    }

    /// Parses the wire/storage representation.
    pub fn from_wire(value: &str) -> Option<OrderStatus> {
        match value {
            "pendente" => Some(OrderStatus::Pending),
            "processando" => Some(OrderStatus::Processing),
            "entregue" => Some(OrderStatus::Delivered),
            "cancelado" => Some(OrderStatus::Canceled),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
