//! # Subscription Client
//!
//! Wraps `ResourceClient<PushSubscription>` with the Subscription Store contract:
//! find by identity or endpoint, insert, delete by id, delete by identity and endpoint.
use crate::model::{
    normalize_identity, EndpointRegistration, PushSubscription, SubscriptionCreate,
    SubscriptionId, SubscriptionQuery,
};
use crate::subscription_actor::SubscriptionError;
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

/// Result of a subscribe call. Registering an endpoint twice is not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum SubscribeOutcome {
    Created(PushSubscription),
    AlreadySubscribed,
}

#[derive(Clone)]
pub struct SubscriptionClient {
    inner: ResourceClient<PushSubscription>,
}

impl SubscriptionClient {
    pub fn new(inner: ResourceClient<PushSubscription>) -> Self {
        Self { inner }
    }

    /// Stores a new endpoint for `identity`.
    #[instrument(skip(self, registration), fields(endpoint = %registration.endpoint))]
    pub async fn subscribe(
        &self,
        identity: &str,
        registration: EndpointRegistration,
    ) -> Result<SubscribeOutcome, SubscriptionError> {
        let params = SubscriptionCreate {
            user_identity: identity.to_string(),
            endpoint: registration.endpoint,
            keys: registration.keys,
        };
        match self.inner.create(params).await.map_err(SubscriptionError::from) {
            Ok(sub) => {
                info!(identity = %sub.user_identity, "Subscription saved");
                Ok(SubscribeOutcome::Created(sub))
            }
            Err(SubscriptionError::AlreadySubscribed(_)) => {
                debug!("Subscription already exists");
                Ok(SubscribeOutcome::AlreadySubscribed)
            }
            Err(e) => Err(e),
        }
    }

    /// Removes the endpoint registered by `identity`. Returns how many records went away.
    #[instrument(skip(self))]
    pub async fn unsubscribe(&self, identity: &str, endpoint: &str) -> Result<usize, SubscriptionError> {
        let Some(identity) = normalize_identity(Some(identity)) else {
            return Ok(0);
        };
        Ok(self
            .inner
            .delete_where(SubscriptionQuery::ByIdentityAndEndpoint {
                identity,
                endpoint: endpoint.trim().to_string(),
            })
            .await?)
    }

    pub async fn find_by_identity(&self, identity: &str) -> Result<Vec<PushSubscription>, SubscriptionError> {
        let Some(identity) = normalize_identity(Some(identity)) else {
            return Ok(Vec::new());
        };
        Ok(self.inner.list(SubscriptionQuery::ByIdentity(identity)).await?)
    }

    pub async fn find_by_endpoint(&self, endpoint: &str) -> Result<Option<PushSubscription>, SubscriptionError> {
        let found = self
            .inner
            .list(SubscriptionQuery::ByEndpoint(endpoint.trim().to_string()))
            .await?;
        Ok(found.into_iter().next())
    }

    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, id: SubscriptionId) -> Result<(), SubscriptionError> {
        Ok(self.inner.delete(id).await?)
    }
}

#[async_trait]
impl ActorClient<PushSubscription> for SubscriptionClient {
    type Error = SubscriptionError;

    fn inner(&self) -> &ResourceClient<PushSubscription> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        SubscriptionError::from(e)
    }
}
