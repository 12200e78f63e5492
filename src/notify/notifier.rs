//! # Per-user fan-out
//!
//! [`Notifier::notify_user`] delivers one payload to every device a user registered.
//! Deliveries run concurrently and independently; an endpoint reported as expired is
//! deleted from the Subscription Store, anything else is only logged.

use super::composer::NotificationPayload;
use super::dispatcher::{DeliveryOutcome, PushDispatcher};
use crate::clients::SubscriptionClient;
use crate::model::PushSubscription;
use futures::future::join_all;
use tracing::{debug, info, instrument, warn};

/// What happened to one fan-out, for logs and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanoutReport {
    pub delivered: usize,
    pub expired: usize,
    pub failed: usize,
}

impl FanoutReport {
    pub fn attempts(&self) -> usize {
        self.delivered + self.expired + self.failed
    }
}

#[derive(Clone)]
pub struct Notifier {
    subscriptions: SubscriptionClient,
    dispatcher: PushDispatcher,
}

impl Notifier {
    pub fn new(subscriptions: SubscriptionClient, dispatcher: PushDispatcher) -> Self {
        Self {
            subscriptions,
            dispatcher,
        }
    }

    pub fn dispatcher(&self) -> &PushDispatcher {
        &self.dispatcher
    }

    /// Sends `payload` to all of `identity`'s subscriptions. Never fails.
    #[instrument(skip(self, payload), fields(tag = %payload.tag))]
    pub async fn notify_user(&self, identity: &str, payload: &NotificationPayload) -> FanoutReport {
        if !self.dispatcher.is_configured() {
            return FanoutReport::default();
        }

        let subscriptions = match self.subscriptions.find_by_identity(identity).await {
            Ok(subs) => subs,
            Err(e) => {
                warn!(error = %e, "Could not load subscriptions");
                return FanoutReport::default();
            }
        };
        if subscriptions.is_empty() {
            debug!("No push subscriptions");
            return FanoutReport::default();
        }

        let outcomes = join_all(
            subscriptions
                .iter()
                .map(|sub| self.deliver_one(sub, payload)),
        )
        .await;

        let mut report = FanoutReport::default();
        for outcome in outcomes {
            match outcome {
                DeliveryOutcome::Delivered => report.delivered += 1,
                DeliveryOutcome::Expired => report.expired += 1,
                DeliveryOutcome::Failed => report.failed += 1,
                DeliveryOutcome::NotConfigured => {}
            }
        }
        info!(
            delivered = report.delivered,
            expired = report.expired,
            failed = report.failed,
            "Push fan-out finished"
        );
        report
    }

    async fn deliver_one(&self, sub: &PushSubscription, payload: &NotificationPayload) -> DeliveryOutcome {
        let outcome = self.dispatcher.send(sub, payload).await;
        match outcome {
            DeliveryOutcome::Expired => {
                info!(endpoint = %sub.endpoint, "Subscription expired, removing");
                if let Err(e) = self.subscriptions.delete_by_id(sub.id.clone()).await {
                    // a concurrent fan-out may have pruned it first
                    debug!(endpoint = %sub.endpoint, error = %e, "Prune skipped");
                }
            }
            DeliveryOutcome::Failed => {
                warn!(endpoint = %sub.endpoint, "Push delivery failed");
            }
            DeliveryOutcome::Delivered | DeliveryOutcome::NotConfigured => {}
        }
        outcome
    }
}
