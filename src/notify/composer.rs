//! # Notification Composer
//!
//! Pure mapping from (order, status, audience) to the JSON payload a service worker
//! shows. Status strings are taken as-is, so display aliases (`cancelled`, `delivered`,
//! `processing`) are accepted here even though they are never persisted.

use crate::model::{Order, OrderId};
use serde::{Deserialize, Serialize};

const ICON: &str = "/icon-192x192.png";
const NEW_ORDER_TITLE: &str = "🔔 New Order Alert!";

/// Status used for the final notification sent when staff delete an order.
pub const CANCELLED: &str = "cancelled";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Admin,
    Customer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub tag: String,
    pub data: NotificationData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    pub url: String,
    pub order_id: String,
    pub status: String,
    pub is_admin: bool,
}

/// Customer-facing text for a status. Total over all strings.
pub fn customer_status_message(status: &str) -> String {
    match status {
        "accepted" => "Your order has been accepted!".to_string(),
        "processing" => "Your order is being prepared...".to_string(),
        "completed" | "delivered" => "Your order has been delivered!".to_string(),
        "declined" | "cancelled" => "Your order has been cancelled".to_string(),
        other => format!("Order status: {other}"),
    }
}

#[derive(Debug, Clone)]
pub struct NotificationComposer {
    currency: String,
    brand: String,
}

impl NotificationComposer {
    pub fn new(currency: impl Into<String>, brand: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            brand: brand.into(),
        }
    }

    /// Admin alert for a freshly placed order.
    pub fn new_order(&self, order: &Order) -> NotificationPayload {
        let body = format!(
            "New order #{} - {}{}",
            order.id,
            self.currency,
            order.total_amount.normalize()
        );
        self.payload(&order.id, order.status.as_str(), Audience::Admin, NEW_ORDER_TITLE.to_string(), body)
    }

    /// Notification for a status change, worded for `audience`.
    pub fn status_changed(&self, order_id: &OrderId, status: &str, audience: Audience) -> NotificationPayload {
        let body = match audience {
            Audience::Customer => customer_status_message(status),
            Audience::Admin => format!("Order #{order_id} status: {status}"),
        };
        let title = format!("{} Order Update", self.brand);
        self.payload(order_id, status, audience, title, body)
    }

    fn payload(
        &self,
        order_id: &OrderId,
        status: &str,
        audience: Audience,
        title: String,
        body: String,
    ) -> NotificationPayload {
        let is_admin = audience == Audience::Admin;
        let url = if is_admin {
            "/admin".to_string()
        } else {
            format!("/history?orderId={order_id}")
        };
        NotificationPayload {
            title,
            body,
            icon: ICON.to_string(),
            badge: ICON.to_string(),
            tag: format!("order-{order_id}"),
            data: NotificationData {
                url,
                order_id: order_id.to_string(),
                status: status.to_string(),
                is_admin,
            },
        }
    }
}
