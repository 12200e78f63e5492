use actor_framework::FrameworkError;

/// Errors produced by the Subscription actor and its client.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubscriptionError {
    #[error("Invalid subscription: {0}")]
    InvalidSubscription(String),

    #[error("Subscription not found: {0}")]
    NotFound(String),

    #[error("Endpoint already registered: {0}")]
    AlreadySubscribed(String),

    #[error("Subscription store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<FrameworkError> for SubscriptionError {
    fn from(e: FrameworkError) -> Self {
        if e.is_unavailable() {
            return SubscriptionError::StoreUnavailable(e.to_string());
        }
        match e.into_entity_error::<SubscriptionError>() {
            Ok(inner) => inner,
            Err(FrameworkError::NotFound(id)) => SubscriptionError::NotFound(id),
            Err(FrameworkError::AlreadyExists(endpoint)) => {
                SubscriptionError::AlreadySubscribed(endpoint)
            }
            Err(other) => SubscriptionError::StoreUnavailable(other.to_string()),
        }
    }
}
