use super::SubscriptionError;
use crate::model::{
    normalize_identity, PushSubscription, SubscriptionCreate, SubscriptionId, SubscriptionQuery,
    SubscriptionUpdate,
};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Url;

fn validate_endpoint(endpoint: &str) -> Result<String, SubscriptionError> {
    let url = Url::parse(endpoint.trim())
        .map_err(|e| SubscriptionError::InvalidSubscription(format!("endpoint: {e}")))?;
    match url.scheme() {
        "https" | "http" if url.has_host() => Ok(endpoint.trim().to_string()),
        _ => Err(SubscriptionError::InvalidSubscription(
            "endpoint must be an absolute http(s) URL".into(),
        )),
    }
}

#[async_trait]
impl ActorEntity for PushSubscription {
    type Id = SubscriptionId;
    type Create = SubscriptionCreate;
    type Update = SubscriptionUpdate;
    type Query = SubscriptionQuery;
    type Context = ();
    type Error = SubscriptionError;

    fn from_create_params(id: SubscriptionId, params: SubscriptionCreate) -> Result<Self, Self::Error> {
        let user_identity = normalize_identity(Some(params.user_identity.as_str()))
            .ok_or_else(|| SubscriptionError::InvalidSubscription("identity is required".into()))?;
        let endpoint = validate_endpoint(&params.endpoint)?;
        if params.keys.p256dh.trim().is_empty() || params.keys.auth.trim().is_empty() {
            return Err(SubscriptionError::InvalidSubscription(
                "keys.p256dh and keys.auth are required".into(),
            ));
        }

        Ok(Self {
            id,
            user_identity,
            endpoint,
            keys: params.keys,
            created_at: Utc::now(),
        })
    }

    fn matches(&self, query: &SubscriptionQuery) -> bool {
        match query {
            SubscriptionQuery::ByIdentity(identity) => &self.user_identity == identity,
            SubscriptionQuery::ByEndpoint(endpoint) => &self.endpoint == endpoint,
            SubscriptionQuery::ByIdentityAndEndpoint { identity, endpoint } => {
                &self.user_identity == identity && &self.endpoint == endpoint
            }
        }
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.endpoint.clone())
    }

    async fn on_update(&mut self, update: SubscriptionUpdate, _ctx: &()) -> Result<(), Self::Error> {
        match update {}
    }
}
