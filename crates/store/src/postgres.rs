use async_trait::async_trait;
use common::{ItemId, OrderId, UserId};
use domain::{Money, NewOrderItem, Order, OrderItem, OrderStatus, User, recompute_total};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, Row, Transaction};
use uuid::Uuid;

use crate::{Result, Store, StoreError};

const ORDER_COLUMNS: &str = "id, owner_id, status, total_cents, created_at";
const ITEM_COLUMNS: &str = "id, order_id, product_name, quantity, unit_price_cents, subtotal_cents";

/// PostgreSQL-backed store implementation.
///
/// Item mutations run in a transaction that locks the parent order row
/// (`SELECT ... FOR UPDATE`), so concurrent mutations against the same
/// order serialize and the stored total always matches the item set.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new PostgreSQL store on an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database at `url` with a small pool.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new().max_connections(5).connect(url).await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_user(row: PgRow) -> Result<User> {
        Ok(User {
            id: UserId::from_uuid(row.try_get::<Uuid, _>("id")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            active: row.try_get("active")?,
            admin: row.try_get("admin")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let status: String = row.try_get("status")?;
        let status = OrderStatus::from_wire(&status)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown order status {status:?}")))?;

        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            owner_id: UserId::from_uuid(row.try_get::<Uuid, _>("owner_id")?),
            status,
            total: Money::from_cents(row.try_get("total_cents")?),
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_item(row: PgRow) -> Result<OrderItem> {
        let quantity: i32 = row.try_get("quantity")?;

        Ok(OrderItem {
            id: ItemId::from_uuid(row.try_get::<Uuid, _>("id")?),
            order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
            product_name: row.try_get("product_name")?,
            quantity: quantity as u32,
            unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
            subtotal: Money::from_cents(row.try_get("subtotal_cents")?),
        })
    }

    /// Loads and locks the order row for the rest of the transaction.
    async fn lock_order(&self, tx: &mut Transaction<'_, Postgres>, id: OrderId) -> Result<Order> {
        let row = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&mut **tx)
        .await?;

        match row {
            Some(row) => Self::row_to_order(row),
            None => Err(StoreError::OrderNotFound(id)),
        }
    }

    /// Recomputes the order total from its full item set and writes it
    /// back, all inside the caller's transaction.
    async fn write_recomputed_total(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_id: OrderId,
    ) -> Result<()> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY seq"
        ))
        .bind(order_id.as_uuid())
        .fetch_all(&mut **tx)
        .await?;

        let items = rows
            .into_iter()
            .map(Self::row_to_item)
            .collect::<Result<Vec<_>>>()?;
        let total = recompute_total(&items);

        sqlx::query("UPDATE orders SET total_cents = $2 WHERE id = $1")
            .bind(order_id.as_uuid())
            .bind(total.cents())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: User) -> Result<User> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, active, admin, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.active)
        .bind(user.admin)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("users_email_key")
            {
                return StoreError::EmailTaken(user.email.clone());
            }
            StoreError::Database(e)
        })?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, name, email, password_hash, active, admin, created_at \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, name, email, password_hash, active, admin, created_at \
             FROM users WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn create_order(&self, order: Order) -> Result<Order> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, owner_id, status, total_cents, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.owner_id.as_uuid())
        .bind(order.status.as_str())
        .bind(order.total.cents())
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;

        Ok(order)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn list_orders_by_owner(&self, owner_id: UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE owner_id = $1 ORDER BY created_at"
        ))
        .bind(owner_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn list_all_orders(&self) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn finalize_order(&self, id: OrderId) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        let mut order = self.lock_order(&mut tx, id).await?;
        order.status = order.status.finalize()?;

        sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(order.status.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(order)
    }

    async fn cancel_order(&self, id: OrderId) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        let mut order = self.lock_order(&mut tx, id).await?;
        order.status = order.status.cancel();

        sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(order.status.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(order)
    }

    async fn add_item(&self, order_id: OrderId, item: NewOrderItem) -> Result<OrderItem> {
        let mut tx = self.pool.begin().await?;

        let order = self.lock_order(&mut tx, order_id).await?;
        order.ensure_modifiable()?;

        let item = item.into_item(order_id);
        sqlx::query(
            r#"
            INSERT INTO order_items (id, order_id, product_name, quantity, unit_price_cents, subtotal_cents)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(item.order_id.as_uuid())
        .bind(&item.product_name)
        .bind(item.quantity as i32)
        .bind(item.unit_price.cents())
        .bind(item.subtotal.cents())
        .execute(&mut *tx)
        .await?;

        self.write_recomputed_total(&mut tx, order_id).await?;

        tx.commit().await?;
        Ok(item)
    }

    async fn remove_item(&self, order_id: OrderId, item_id: ItemId) -> Result<OrderItem> {
        let mut tx = self.pool.begin().await?;

        let order = self.lock_order(&mut tx, order_id).await?;
        order.ensure_modifiable()?;

        // Snapshot the row before deleting so the caller can report it.
        let row = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE id = $1 AND order_id = $2"
        ))
        .bind(item_id.as_uuid())
        .bind(order_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        let removed = match row {
            Some(row) => Self::row_to_item(row)?,
            None => return Err(StoreError::ItemNotFound { order_id, item_id }),
        };

        sqlx::query("DELETE FROM order_items WHERE id = $1 AND order_id = $2")
            .bind(item_id.as_uuid())
            .bind(order_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        self.write_recomputed_total(&mut tx, order_id).await?;

        tx.commit().await?;
        Ok(removed)
    }

    async fn list_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY seq"
        ))
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_item).collect()
    }
}
