use crate::model::OrderStatus;
use actor_framework::FrameworkError;

/// Errors produced by the Order actor and its client.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderError {
    #[error("Invalid order data: {0}")]
    InvalidOrderData(String),

    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Unknown order status: {0}")]
    UnknownStatus(String),

    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<FrameworkError> for OrderError {
    fn from(e: FrameworkError) -> Self {
        if e.is_unavailable() {
            return OrderError::StoreUnavailable(e.to_string());
        }
        match e.into_entity_error::<OrderError>() {
            Ok(inner) => inner,
            Err(FrameworkError::NotFound(id)) => OrderError::NotFound(id),
            Err(other) => OrderError::StoreUnavailable(other.to_string()),
        }
    }
}
