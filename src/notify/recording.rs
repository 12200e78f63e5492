//! # Recording Transport
//!
//! In-memory [`PushTransport`] for tests: remembers every attempt and answers with an
//! outcome scripted per endpoint (default [`DeliveryOutcome::Delivered`]).
//!
//! ```rust
//! use cafe_orders::notify::recording::RecordingTransport;
//! use cafe_orders::notify::{DeliveryOutcome, PushDispatcher};
//! use std::sync::Arc;
//!
//! let transport = Arc::new(RecordingTransport::new());
//! transport.script("https://push.example.com/old-phone", DeliveryOutcome::Expired);
//! let dispatcher = PushDispatcher::new(transport.clone());
//! assert!(dispatcher.is_configured());
//! ```

use super::composer::NotificationPayload;
use super::dispatcher::{DeliveryOutcome, PushTransport};
use crate::model::PushSubscription;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// One recorded delivery attempt.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub endpoint: String,
    pub identity: String,
    pub payload: NotificationPayload,
    pub outcome: DeliveryOutcome,
}

#[derive(Default)]
pub struct RecordingTransport {
    scripted: Mutex<HashMap<String, DeliveryOutcome>>,
    attempts: Mutex<Vec<Attempt>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every future delivery to `endpoint` answers `outcome`.
    pub fn script(&self, endpoint: &str, outcome: DeliveryOutcome) {
        if let Ok(mut scripted) = self.scripted.lock() {
            scripted.insert(endpoint.to_string(), outcome);
        }
    }

    pub fn attempts(&self) -> Vec<Attempt> {
        self.attempts
            .lock()
            .map(|attempts| attempts.clone())
            .unwrap_or_default()
    }

    /// Attempts addressed to `identity`, in the order they were made.
    pub fn attempts_for(&self, identity: &str) -> Vec<Attempt> {
        self.attempts()
            .into_iter()
            .filter(|a| a.identity == identity)
            .collect()
    }
}

#[async_trait]
impl PushTransport for RecordingTransport {
    async fn deliver(&self, subscription: &PushSubscription, payload: &[u8]) -> DeliveryOutcome {
        let outcome = self
            .scripted
            .lock()
            .ok()
            .and_then(|scripted| scripted.get(&subscription.endpoint).copied())
            .unwrap_or(DeliveryOutcome::Delivered);

        let Ok(payload) = serde_json::from_slice::<NotificationPayload>(payload) else {
            return DeliveryOutcome::Failed;
        };

        if let Ok(mut attempts) = self.attempts.lock() {
            attempts.push(Attempt {
                endpoint: subscription.endpoint.clone(),
                identity: subscription.user_identity.clone(),
                payload,
                outcome,
            });
        }
        outcome
    }
}
