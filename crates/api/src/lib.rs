//! HTTP API server for the order-management system.
//!
//! Provides REST endpoints for account registration, authentication,
//! and order/item management, with structured logging (tracing) and
//! Prometheus metrics.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;

use std::sync::Arc;

use auth::TokenIssuer;
use axum::Router;
use axum::routing::{delete, get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use service::{AccountService, OrderService};
use store::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState<S: Store> {
    pub accounts: AccountService<S>,
    pub orders: OrderService<S>,
}

/// Creates the application state from a store and token issuer.
pub fn create_state<S: Store + Clone>(store: S, tokens: TokenIssuer) -> Arc<AppState<S>> {
    Arc::new(AppState {
        accounts: AccountService::new(store.clone(), tokens),
        orders: OrderService::new(store),
    })
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Store + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/auth/create_account", post(routes::auth::create_account::<S>))
        .route("/auth/login", post(routes::auth::login::<S>))
        .route("/auth/refresh_token", post(routes::auth::refresh_token::<S>))
        .route("/orders", post(routes::orders::create::<S>))
        .route("/orders/list", get(routes::orders::list::<S>))
        .route("/orders/my", get(routes::orders::my::<S>))
        .route(
            "/orders/{id}",
            get(routes::orders::get::<S>).delete(routes::orders::cancel::<S>),
        )
        .route("/orders/{id}/finalize", post(routes::orders::finalize::<S>))
        .route("/orders/add-item/{id}", post(routes::orders::add_item::<S>))
        .route("/orders/{id}/items", get(routes::orders::list_items::<S>))
        .route(
            "/orders/{id}/items/{item_id}",
            delete(routes::orders::remove_item::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
