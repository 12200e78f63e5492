//! HTTP error mapping.
//!
//! Domain errors convert into [`ApiError`] with `?`; the response body is
//! `{"message": ...}`.

use crate::order_actor::OrderError;
use crate::subscription_actor::SubscriptionError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Subscription(#[from] SubscriptionError),

    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Order(e) => match e {
                OrderError::InvalidOrderData(_) | OrderError::UnknownStatus(_) => {
                    StatusCode::BAD_REQUEST
                }
                OrderError::NotFound(_) => StatusCode::NOT_FOUND,
                OrderError::InvalidTransition { .. } => StatusCode::CONFLICT,
                OrderError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            ApiError::Subscription(e) => match e {
                SubscriptionError::InvalidSubscription(_) => StatusCode::BAD_REQUEST,
                SubscriptionError::NotFound(_) => StatusCode::NOT_FOUND,
                SubscriptionError::AlreadySubscribed(_) => StatusCode::CONFLICT,
                SubscriptionError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, %status, "Request rejected");
        }
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}
