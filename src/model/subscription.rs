use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

/// Type-safe identifier for push subscriptions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(pub String);

impl SubscriptionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key material the browser hands out with an endpoint, both base64url encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// A push endpoint registered by one device of one user.
///
/// A user may own several; the `endpoint` is unique across all of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
    pub id: SubscriptionId,
    pub user_identity: String,
    pub endpoint: String,
    pub keys: SubscriptionKeys,
    pub created_at: DateTime<Utc>,
}

/// Browser-side subscription object, as produced by `PushManager.subscribe()`.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointRegistration {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

#[derive(Debug, Clone)]
pub struct SubscriptionCreate {
    pub user_identity: String,
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

/// Subscriptions are immutable once stored, so there is nothing to update.
#[derive(Debug, Clone)]
pub enum SubscriptionUpdate {}

#[derive(Debug, Clone)]
pub enum SubscriptionQuery {
    ByIdentity(String),
    ByEndpoint(String),
    ByIdentityAndEndpoint { identity: String, endpoint: String },
}
