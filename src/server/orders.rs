//! `/api/orders` handlers: thin adapters over [`OrderLifecycle`](crate::lifecycle::OrderLifecycle).

use super::error::ApiError;
use super::AppState;
use crate::model::{Order, OrderCreate, OrderId, OrderStatus};
use crate::order_actor::OrderError;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: String,
}

/// POST /api/orders
pub async fn create(
    State(state): State<AppState>,
    Json(draft): Json<OrderCreate>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let order = state.lifecycle.create_order(draft).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(state.lifecycle.list_all().await?))
}

/// GET /api/orders/history/{identity}
pub async fn history(
    State(state): State<AppState>,
    Path(identity): Path<String>,
) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(state.lifecycle.list_by_customer(&identity).await?))
}

/// PUT /api/orders/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> Result<Json<Order>, ApiError> {
    let status: OrderStatus = body.status.parse().map_err(OrderError::UnknownStatus)?;
    Ok(Json(state.lifecycle.set_status(OrderId(id), status).await?))
}

/// DELETE /api/orders/{id}
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.lifecycle.delete_order(OrderId(id)).await?;
    Ok(Json(json!({ "message": "Order deleted successfully" })))
}
