/// Represents a customer order.
///
/// # Actor Framework
/// This struct implements the [`ActorEntity`](actor_framework::ActorEntity) trait,
/// allowing it to be managed by a [`ResourceActor`](actor_framework::ResourceActor).
///
/// See [`crate::order_actor::entity`] for creation rules ([`OrderCreate`]) and the
/// status transitions accepted by [`OrderUpdate`].
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use uuid::Uuid;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    /// Mints a fresh random id. Used as the order actor's id generator.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderKind {
    DineIn,
    Parcel,
}

/// Persisted order status.
///
/// Only these four values are ever stored. Display aliases such as `cancelled` or
/// `delivered` exist solely in [`crate::notify::composer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Accepted,
    Declined,
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Declined => "declined",
            OrderStatus::Completed => "completed",
        }
    }

    /// Forward edges of the status machine.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Accepted)
                | (OrderStatus::Pending, OrderStatus::Declined)
                | (OrderStatus::Accepted, OrderStatus::Completed)
        )
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(OrderStatus::Pending),
            "accepted" => Ok(OrderStatus::Accepted),
            "declined" => Ok(OrderStatus::Declined),
            "completed" => Ok(OrderStatus::Completed),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub item_id: String,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl LineItem {
    /// `unitPrice × quantity`, or `None` when it does not fit in a `Decimal`.
    pub fn subtotal(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub kind: OrderKind,
    pub line_items: Vec<LineItem>,
    pub total_amount: Decimal,
    pub customer_identity: Option<String>,
    pub customer_name: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a new order (the customer's submission).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    pub kind: OrderKind,
    pub line_items: Vec<LineItem>,
    pub total_amount: Decimal,
    #[serde(default)]
    pub customer_identity: Option<String>,
    pub customer_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone)]
pub enum OrderUpdate {
    SetStatus(OrderStatus),
}

#[derive(Debug, Clone)]
pub enum OrderQuery {
    All,
    ByCustomer(String),
}
