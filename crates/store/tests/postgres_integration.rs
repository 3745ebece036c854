//! PostgreSQL integration tests
//!
//! These tests spin up a shared PostgreSQL container and are ignored
//! by default since they need a Docker daemon. Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration -- --ignored --test-threads=1
//! ```

use std::sync::Arc;

use common::ItemId;
use domain::{DomainError, Money, NewOrderItem, Order, OrderStatus, User, recompute_total};
use sqlx::PgPool;
use store::{PgStore, Store, StoreError};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for the schema
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            sqlx::raw_sql(include_str!("../../../migrations/0001_initial_schema.sql"))
                .execute(&temp_pool)
                .await
                .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PgStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE order_items, orders, users")
        .execute(&pool)
        .await
        .unwrap();

    PgStore::new(pool)
}

async fn seeded_order(store: &PgStore) -> Order {
    let user = store
        .create_user(User::new("owner", "owner@test.com", "hash", true, false))
        .await
        .unwrap();
    let order = Order::create(user.id, Money::parse("0.01").unwrap()).unwrap();
    store.create_order(order).await.unwrap()
}

fn new_item(name: &str, quantity: u32, price: &str) -> NewOrderItem {
    NewOrderItem::new(name, quantity, Money::parse(price).unwrap()).unwrap()
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn user_roundtrip_and_email_conflict() {
    let store = get_test_store().await;

    let user = store
        .create_user(User::new("maria", "maria@test.com", "hash", true, false))
        .await
        .unwrap();

    let by_email = store
        .find_user_by_email("maria@test.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, user.id);

    let duplicate = store
        .create_user(User::new("other", "maria@test.com", "hash", true, false))
        .await;
    assert!(matches!(duplicate, Err(StoreError::EmailTaken(_))));
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn add_and_remove_item_recomputes_total() {
    let store = get_test_store().await;
    let order = seeded_order(&store).await;

    store
        .add_item(order.id, new_item("lapis", 2, "3.00"))
        .await
        .unwrap();
    let second = store
        .add_item(order.id, new_item("caneta", 1, "2.50"))
        .await
        .unwrap();

    let stored = store.get_order(order.id).await.unwrap().unwrap();
    assert_eq!(stored.total, Money::parse("8.50").unwrap());

    let removed = store.remove_item(order.id, second.id).await.unwrap();
    assert_eq!(removed.product_name, "caneta");

    let stored = store.get_order(order.id).await.unwrap().unwrap();
    assert_eq!(stored.total, Money::parse("6.00").unwrap());

    let items = store.list_items(order.id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product_name, "lapis");
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn remove_unknown_item_not_found() {
    let store = get_test_store().await;
    let order = seeded_order(&store).await;

    let result = store.remove_item(order.id, ItemId::new()).await;
    assert!(matches!(result, Err(StoreError::ItemNotFound { .. })));
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn status_transitions_guarded_under_lock() {
    let store = get_test_store().await;
    let order = seeded_order(&store).await;

    let delivered = store.finalize_order(order.id).await.unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);

    let again = store.finalize_order(order.id).await;
    assert!(matches!(
        again,
        Err(StoreError::Domain(DomainError::AlreadyFinalized))
    ));

    let mutation = store.add_item(order.id, new_item("lapis", 1, "1.00")).await;
    assert!(matches!(
        mutation,
        Err(StoreError::Domain(DomainError::NotModifiable { .. }))
    ));
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn concurrent_adds_keep_total_consistent() {
    let store = get_test_store().await;
    let order = seeded_order(&store).await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let store = store.clone();
        let order_id = order.id;
        handles.push(tokio::spawn(async move {
            store
                .add_item(order_id, new_item("lapis", 1, "1.00"))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let stored = store.get_order(order.id).await.unwrap().unwrap();
    let items = store.list_items(order.id).await.unwrap();
    assert_eq!(items.len(), 10);
    assert_eq!(stored.total, recompute_total(&items));
    assert_eq!(stored.total, Money::parse("10.00").unwrap());
}
