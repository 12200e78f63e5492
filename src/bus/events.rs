use crate::model::{Order, OrderId};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A named set of live connections.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Room {
    /// Shared by every staff dashboard.
    Admin,
    /// One per customer identity.
    User(String),
}

impl Display for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Room::Admin => f.write_str("admin"),
            Room::User(identity) => f.write_str(identity),
        }
    }
}

/// Server → client event. Serialized as `{"event": "...", "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum LiveEvent {
    NewOrder(Order),
    OrderStatusUpdated(Order),
    OrderDeleted { id: OrderId },
}

impl LiveEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LiveEvent::NewOrder(_) => "newOrder",
            LiveEvent::OrderStatusUpdated(_) => "orderStatusUpdated",
            LiveEvent::OrderDeleted { .. } => "orderDeleted",
        }
    }
}

/// Client → server message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    JoinAdmin,
    JoinUser { identity: String },
}
