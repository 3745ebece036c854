//! Order and line-item endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{ItemId, OrderId, UserId};
use domain::{Money, Order, OrderItem, OrderStatus};
use serde::{Deserialize, Serialize};
use store::Store;
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use crate::extract::CurrentUser;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub preco: Money,
}

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub nome_produto: String,
    pub quantidade: u32,
    pub preco_unitario: Money,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub all: bool,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub pedido_id: OrderId,
    pub usuario_id: UserId,
    pub status: OrderStatus,
    pub preco: Money,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            pedido_id: order.id,
            usuario_id: order.owner_id,
            status: order.status,
            preco: order.total,
        }
    }
}

#[derive(Serialize)]
pub struct ItemResponse {
    pub id: ItemId,
    pub pedido_id: OrderId,
    pub nome_produto: String,
    pub quantidade: u32,
    pub preco_unitario: Money,
    pub subtotal: Money,
}

impl From<OrderItem> for ItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            id: item.id,
            pedido_id: item.order_id,
            nome_produto: item.product_name,
            quantidade: item.quantity,
            preco_unitario: item.unit_price,
            subtotal: item.subtotal,
        }
    }
}

// -- Handlers --

/// GET /orders/list?all=bool — the caller's orders, or everyone's for
/// admins.
#[tracing::instrument(skip(state, user))]
pub async fn list<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state.orders.list_orders(&user, params.all).await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// GET /orders/my — the caller's orders.
#[tracing::instrument(skip(state, user))]
pub async fn my<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state.orders.list_orders(&user, false).await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// POST /orders — create an order owned by the caller.
#[tracing::instrument(skip(state, user, req))]
pub async fn create<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.orders.create_order(&user, req.preco).await?;
    Ok(Json(order.into()))
}

/// GET /orders/{id} — load an order by ID.
#[tracing::instrument(skip(state, _user))]
pub async fn get<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.orders.get_order(OrderId::from_uuid(id)).await?;
    Ok(Json(order.into()))
}

/// DELETE /orders/{id} — cancel an order (soft delete).
#[tracing::instrument(skip(state, user))]
pub async fn cancel<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state
        .orders
        .cancel_order(&user, OrderId::from_uuid(id))
        .await?;
    Ok(Json(order.into()))
}

/// POST /orders/{id}/finalize — mark an order delivered.
#[tracing::instrument(skip(state, user))]
pub async fn finalize<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state
        .orders
        .finalize_order(&user, OrderId::from_uuid(id))
        .await?;
    Ok(Json(order.into()))
}

/// POST /orders/add-item/{id} — add a line item to an order.
#[tracing::instrument(skip(state, user, req))]
pub async fn add_item<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError> {
    let item = state
        .orders
        .add_item(
            &user,
            OrderId::from_uuid(id),
            req.nome_produto,
            req.quantidade,
            req.preco_unitario,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(item.into())))
}

/// GET /orders/{id}/items — list an order's line items.
#[tracing::instrument(skip(state, user))]
pub async fn list_items<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ItemResponse>>, ApiError> {
    let items = state
        .orders
        .list_items(&user, OrderId::from_uuid(id))
        .await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

/// DELETE /orders/{id}/items/{item_id} — remove a line item, returning
/// its pre-deletion snapshot.
#[tracing::instrument(skip(state, user))]
pub async fn remove_item<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(user): CurrentUser,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ItemResponse>, ApiError> {
    let removed = state
        .orders
        .remove_item(&user, OrderId::from_uuid(id), ItemId::from_uuid(item_id))
        .await?;
    Ok(Json(removed.into()))
}
