use super::OrderLifecycle;
use crate::bus::EventBus;
use crate::clients::{OrderClient, SubscriptionClient};
use crate::config::Config;
use crate::notify::webpush::PushError;
use crate::notify::{NotificationComposer, Notifier, PushDispatcher};
use crate::{order_actor, subscription_actor};
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::info;

/// Owns the running store actors and everything wired on top of them.
///
/// Dropping clones of the clients elsewhere is fine; for `shutdown` to return, every
/// clone handed out (e.g. to the HTTP state) must be gone first.
pub struct OrderSystem {
    pub lifecycle: OrderLifecycle,
    pub orders: OrderClient,
    pub subscriptions: SubscriptionClient,
    pub bus: EventBus,
    handles: Vec<JoinHandle<()>>,
}

impl OrderSystem {
    /// Starts the stores with web push configured from `config`.
    pub fn from_config(config: &Config) -> Result<Self, PushError> {
        let dispatcher = PushDispatcher::from_config(config)?;
        Ok(Self::new(config, dispatcher))
    }

    /// Starts the stores with an explicit dispatcher.
    pub fn new(config: &Config, dispatcher: PushDispatcher) -> Self {
        // 1. Create actors
        let (order_actor, orders) = order_actor::new(config.store_buffer);
        let (subscription_actor, subscriptions) = subscription_actor::new(config.store_buffer);

        // 2. Start them (no context dependencies)
        let handles = vec![
            tokio::spawn(order_actor.run(())),
            tokio::spawn(subscription_actor.run(())),
        ];

        // 3. Wire the lifecycle controller
        let bus = EventBus::new(config.live_channel_capacity);
        let push_enabled = dispatcher.is_configured();
        let notifier = Notifier::new(subscriptions.clone(), dispatcher);
        let composer = NotificationComposer::new(&config.currency_symbol, &config.cafe_name);
        let lifecycle = OrderLifecycle::new(
            orders.clone(),
            bus.clone(),
            notifier,
            composer,
            config.admin_identity.clone(),
            TaskTracker::new(),
        );

        info!(
            push_enabled,
            admin_push = config.admin_identity.is_some(),
            "Order system started"
        );

        Self {
            lifecycle,
            orders,
            subscriptions,
            bus,
            handles,
        }
    }

    /// Waits for in-flight notifications, then stops the store actors.
    pub async fn shutdown(self) -> Result<(), tokio::task::JoinError> {
        let tasks = self.lifecycle.tasks().clone();
        tasks.close();
        tasks.wait().await;
        info!("Pending notifications flushed");

        // Drop clients so the actors' channels close
        drop(self.lifecycle);
        drop(self.orders);
        drop(self.subscriptions);

        for handle in self.handles {
            handle.await?;
        }
        info!("Order system stopped");
        Ok(())
    }
}

