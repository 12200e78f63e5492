//! # Push Dispatcher
//!
//! Sends one composed payload to one subscription and reports how it went. Whether
//! delivery is possible at all is decided once, when the dispatcher is built: without
//! VAPID credentials every send short-circuits to [`DeliveryOutcome::NotConfigured`].

use super::composer::NotificationPayload;
use super::webpush::{PushError, VapidSigner, WebPushTransport};
use crate::config::{Config, VapidCredentials};
use crate::model::PushSubscription;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// The push service no longer knows the endpoint; the subscription should be pruned.
    Expired,
    Failed,
    NotConfigured,
}

/// Something that can hand an already serialized payload to a push service.
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn deliver(&self, subscription: &PushSubscription, payload: &[u8]) -> DeliveryOutcome;
}

#[derive(Clone)]
pub struct PushDispatcher {
    transport: Option<Arc<dyn PushTransport>>,
}

impl PushDispatcher {
    pub fn new(transport: Arc<dyn PushTransport>) -> Self {
        Self {
            transport: Some(transport),
        }
    }

    /// A dispatcher that never attempts delivery.
    pub fn disabled() -> Self {
        Self { transport: None }
    }

    /// Builds the web push dispatcher, or a disabled one when credentials are missing.
    /// Malformed credentials are an error.
    pub fn from_config(config: &Config) -> Result<Self, PushError> {
        let Some(VapidCredentials {
            public_key,
            private_key,
            subject,
        }) = &config.vapid
        else {
            warn!("VAPID credentials not set, push notifications disabled");
            return Ok(Self::disabled());
        };

        let signer = VapidSigner::new(public_key, private_key, subject)?;
        let transport = WebPushTransport::new(signer, config.push_timeout, config.push_ttl_secs)?;
        info!("Web push enabled");
        Ok(Self::new(Arc::new(transport)))
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    pub async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &NotificationPayload,
    ) -> DeliveryOutcome {
        let Some(transport) = &self.transport else {
            return DeliveryOutcome::NotConfigured;
        };
        let bytes = match serde_json::to_vec(payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "Could not encode notification payload");
                return DeliveryOutcome::Failed;
            }
        };
        transport.deliver(subscription, &bytes).await
    }
}
