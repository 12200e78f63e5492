//! `/api/subscriptions` handlers.

use super::error::ApiError;
use super::AppState;
use crate::clients::SubscribeOutcome;
use crate::model::EndpointRegistration;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct SubscribeBody {
    pub subscription: Option<EndpointRegistration>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UnsubscribeBody {
    pub endpoint: String,
    pub email: String,
}

/// GET /api/subscriptions/vapidPublicKey
pub async fn vapid_public_key(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "publicKey": state.vapid_public_key.as_ref() }))
}

/// POST /api/subscriptions/subscribe
pub async fn subscribe(
    State(state): State<AppState>,
    Json(body): Json<SubscribeBody>,
) -> Result<Json<Value>, ApiError> {
    let (Some(registration), Some(email)) = (body.subscription, body.email) else {
        return Err(ApiError::BadRequest("Missing subscription or email".into()));
    };
    let message = match state.subscriptions.subscribe(&email, registration).await? {
        SubscribeOutcome::Created(_) => "Subscription saved successfully",
        SubscribeOutcome::AlreadySubscribed => "Subscription already exists",
    };
    Ok(Json(json!({ "message": message })))
}

/// DELETE /api/subscriptions/unsubscribe
pub async fn unsubscribe(
    State(state): State<AppState>,
    Json(body): Json<UnsubscribeBody>,
) -> Result<Json<Value>, ApiError> {
    state
        .subscriptions
        .unsubscribe(&body.email, &body.endpoint)
        .await?;
    Ok(Json(json!({ "message": "Unsubscribed successfully" })))
}
