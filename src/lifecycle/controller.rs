//! # Order Lifecycle Controller
//!
//! Drives every order transition: persist through the Order Store first, then announce
//! on the Event Bus, then hand push notifications to background tasks.
//!
//! ```text
//! create_order ─► OrderClient::create_order ─► bus: admin/newOrder ─► push: admin
//! set_status   ─► OrderClient::update_status ─► bus: user room + all ─► push: customer, admin
//! delete_order ─► OrderClient::get_order ─► push: customer "cancelled" (awaited) ─► delete
//! ```
//!
//! Persistence errors are returned to the caller. Nothing after the store write can
//! fail the transition: broadcasts are fire-and-forget and push fan-out runs on the
//! [`TaskTracker`] without being awaited.

use crate::bus::{EventBus, LiveEvent, Room};
use crate::clients::OrderClient;
use crate::model::{normalize_identity, Order, OrderCreate, OrderId, OrderStatus};
use crate::notify::composer::CANCELLED;
use crate::notify::{Audience, NotificationComposer, NotificationPayload, Notifier};
use crate::order_actor::OrderError;
use tokio_util::task::TaskTracker;
use tracing::{info, info_span, instrument, Instrument};

#[derive(Clone)]
pub struct OrderLifecycle {
    orders: OrderClient,
    bus: EventBus,
    notifier: Notifier,
    composer: NotificationComposer,
    admin_identity: Option<String>,
    tasks: TaskTracker,
}

impl OrderLifecycle {
    pub fn new(
        orders: OrderClient,
        bus: EventBus,
        notifier: Notifier,
        composer: NotificationComposer,
        admin_identity: Option<String>,
        tasks: TaskTracker,
    ) -> Self {
        Self {
            orders,
            bus,
            notifier,
            composer,
            admin_identity: normalize_identity(admin_identity.as_deref()),
            tasks,
        }
    }

    /// Validates and stores a new order, then alerts the staff.
    #[instrument(skip(self, draft), fields(kind = ?draft.kind))]
    pub async fn create_order(&self, draft: OrderCreate) -> Result<Order, OrderError> {
        let order = self.orders.create_order(draft).await?;
        info!(order_id = %order.id, total = %order.total_amount, "Order placed");

        self.bus.broadcast(&Room::Admin, LiveEvent::NewOrder(order.clone()));
        if let Some(admin) = &self.admin_identity {
            self.spawn_notify(admin.clone(), self.composer.new_order(&order));
        }
        Ok(order)
    }

    /// Moves an order to `status` and tells the customer and the staff.
    #[instrument(skip(self))]
    pub async fn set_status(&self, id: OrderId, status: OrderStatus) -> Result<Order, OrderError> {
        let order = self.orders.update_status(id, status).await?;
        info!(order_id = %order.id, status = %order.status, "Order status changed");

        if let Some(identity) = &order.customer_identity {
            self.bus.broadcast(
                &Room::User(identity.clone()),
                LiveEvent::OrderStatusUpdated(order.clone()),
            );
            self.spawn_notify(
                identity.clone(),
                self.composer
                    .status_changed(&order.id, order.status.as_str(), Audience::Customer),
            );
        }

        self.bus.broadcast_all(LiveEvent::OrderStatusUpdated(order.clone()));
        if let Some(admin) = &self.admin_identity {
            self.spawn_notify(
                admin.clone(),
                self.composer
                    .status_changed(&order.id, order.status.as_str(), Audience::Admin),
            );
        }
        Ok(order)
    }

    /// Removes an order. A customer who placed it is sent a "cancelled" notification
    /// first; that fan-out completes before the record is deleted.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, id: OrderId) -> Result<(), OrderError> {
        let order = self.orders.get_order(id.clone()).await?;

        if let Some(identity) = &order.customer_identity {
            let payload = self
                .composer
                .status_changed(&order.id, CANCELLED, Audience::Customer);
            self.notifier.notify_user(identity, &payload).await;
        }

        self.orders.delete_order(id.clone()).await?;
        info!(order_id = %id, "Order deleted");
        self.bus.broadcast(&Room::Admin, LiveEvent::OrderDeleted { id });
        Ok(())
    }

    /// Every order, newest first.
    pub async fn list_all(&self) -> Result<Vec<Order>, OrderError> {
        self.orders.list_all().await
    }

    /// Orders placed under `identity`, newest first.
    pub async fn list_by_customer(&self, identity: &str) -> Result<Vec<Order>, OrderError> {
        self.orders.list_by_customer(identity).await
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Tracker holding the in-flight notification tasks.
    pub fn tasks(&self) -> &TaskTracker {
        &self.tasks
    }

    /// Waits for every notification spawned so far. Later transitions may spawn more.
    pub async fn flush_notifications(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }

    fn spawn_notify(&self, identity: String, payload: NotificationPayload) {
        let notifier = self.notifier.clone();
        let span = info_span!("push", %identity, tag = %payload.tag);
        self.tasks.spawn(
            async move {
                notifier.notify_user(&identity, &payload).await;
            }
            .instrument(span),
        );
    }
}
