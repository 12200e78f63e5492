//! # HTTP & WebSocket surface
//!
//! | Route | Handler |
//! |-------|---------|
//! | `POST /api/orders` | [`orders::create`] |
//! | `GET /api/orders` | [`orders::list`] |
//! | `GET /api/orders/history/{identity}` | [`orders::history`] |
//! | `PUT /api/orders/{id}/status` | [`orders::update_status`] |
//! | `DELETE /api/orders/{id}` | [`orders::remove`] |
//! | `GET /api/subscriptions/vapidPublicKey` | [`subscriptions::vapid_public_key`] |
//! | `POST /api/subscriptions/subscribe` | [`subscriptions::subscribe`] |
//! | `DELETE /api/subscriptions/unsubscribe` | [`subscriptions::unsubscribe`] |
//! | `GET /ws` | [`ws::handle_ws`] |
//!
//! Authentication is handled in front of this service; handlers trust their input.

pub mod error;
pub mod orders;
pub mod subscriptions;
pub mod ws;

pub use error::ApiError;

use crate::bus::EventBus;
use crate::clients::SubscriptionClient;
use crate::lifecycle::{OrderLifecycle, OrderSystem};
use axum::routing::{delete, get, post, put};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

const PING_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct AppState {
    pub lifecycle: OrderLifecycle,
    pub subscriptions: SubscriptionClient,
    pub bus: EventBus,
    pub vapid_public_key: Arc<str>,
    pub ping_interval: Duration,
}

impl AppState {
    pub fn new(system: &OrderSystem, vapid_public_key: &str) -> Self {
        Self {
            lifecycle: system.lifecycle.clone(),
            subscriptions: system.subscriptions.clone(),
            bus: system.bus.clone(),
            vapid_public_key: Arc::from(vapid_public_key),
            ping_interval: PING_INTERVAL,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/orders", post(orders::create).get(orders::list))
        .route("/api/orders/history/{identity}", get(orders::history))
        .route("/api/orders/{id}/status", put(orders::update_status))
        .route("/api/orders/{id}", delete(orders::remove))
        .route(
            "/api/subscriptions/vapidPublicKey",
            get(subscriptions::vapid_public_key),
        )
        .route("/api/subscriptions/subscribe", post(subscriptions::subscribe))
        .route(
            "/api/subscriptions/unsubscribe",
            delete(subscriptions::unsubscribe),
        )
        .route("/ws", get(ws::handle_ws))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
