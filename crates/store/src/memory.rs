use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{ItemId, OrderId, UserId};
use domain::{NewOrderItem, Order, OrderItem, User, recompute_total};
use tokio::sync::RwLock;

use crate::{Result, Store, StoreError};

#[derive(Default)]
struct Inner {
    users: HashMap<UserId, User>,
    orders: HashMap<OrderId, Order>,
    // Kept flat and in insertion order so listings are stable.
    items: Vec<OrderItem>,
}

/// In-memory store implementation for tests and local runs.
///
/// A single write lock around the whole data set serializes mutations,
/// giving item writes and the total recompute the same atomicity the
/// PostgreSQL implementation gets from its transaction.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: User) -> Result<User> {
        let mut inner = self.inner.write().await;

        if inner.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::EmailTaken(user.email));
        }

        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).cloned())
    }

    async fn create_order(&self, order: Order) -> Result<Order> {
        let mut inner = self.inner.write().await;
        inner.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let inner = self.inner.read().await;
        Ok(inner.orders.get(&id).cloned())
    }

    async fn list_orders_by_owner(&self, owner_id: UserId) -> Result<Vec<Order>> {
        let inner = self.inner.read().await;
        let mut orders: Vec<_> = inner
            .orders
            .values()
            .filter(|o| o.owner_id == owner_id)
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }

    async fn list_all_orders(&self) -> Result<Vec<Order>> {
        let inner = self.inner.read().await;
        let mut orders: Vec<_> = inner.orders.values().cloned().collect();
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }

    async fn finalize_order(&self, id: OrderId) -> Result<Order> {
        let mut inner = self.inner.write().await;
        let order = inner
            .orders
            .get_mut(&id)
            .ok_or(StoreError::OrderNotFound(id))?;

        order.status = order.status.finalize()?;
        Ok(order.clone())
    }

    async fn cancel_order(&self, id: OrderId) -> Result<Order> {
        let mut inner = self.inner.write().await;
        let order = inner
            .orders
            .get_mut(&id)
            .ok_or(StoreError::OrderNotFound(id))?;

        order.status = order.status.cancel();
        Ok(order.clone())
    }

    async fn add_item(&self, order_id: OrderId, item: NewOrderItem) -> Result<OrderItem> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let order = inner
            .orders
            .get_mut(&order_id)
            .ok_or(StoreError::OrderNotFound(order_id))?;
        order.ensure_modifiable()?;

        let item = item.into_item(order_id);
        inner.items.push(item.clone());

        let items: Vec<_> = inner
            .items
            .iter()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect();
        order.total = recompute_total(&items);

        Ok(item)
    }

    async fn remove_item(&self, order_id: OrderId, item_id: ItemId) -> Result<OrderItem> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let order = inner
            .orders
            .get_mut(&order_id)
            .ok_or(StoreError::OrderNotFound(order_id))?;
        order.ensure_modifiable()?;

        let position = inner
            .items
            .iter()
            .position(|i| i.id == item_id && i.order_id == order_id)
            .ok_or(StoreError::ItemNotFound { order_id, item_id })?;
        let removed = inner.items.remove(position);

        let items: Vec<_> = inner
            .items
            .iter()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect();
        order.total = recompute_total(&items);

        Ok(removed)
    }

    async fn list_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>> {
        let inner = self.inner.read().await;
        Ok(inner
            .items
            .iter()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect())
    }
}
