//! # Order Actor
//!
//! The Order Store: a [`ResourceActor`] that exclusively owns every [`Order`].
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](actor_framework::ActorEntity) implementation for [`Order`]
//! - [`error`] - [`OrderError`] type shared by the actor and [`OrderClient`]
//! - [`new()`] - Factory function that creates the actor and client
//!
//! Requests are served one at a time, so two status changes racing on the same order
//! are linearized: the second one sees the first one's result and is checked against
//! the status machine from there.
//!
//! ## Usage
//!
//! ```rust
//! use cafe_orders::model::{LineItem, OrderCreate, OrderKind, OrderStatus};
//! use cafe_orders::order_actor;
//! use rust_decimal::Decimal;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (actor, orders) = order_actor::new(8);
//!     tokio::spawn(actor.run(()));
//!
//!     let order = orders
//!         .create_order(OrderCreate {
//!             kind: OrderKind::DineIn,
//!             line_items: vec![LineItem {
//!                 item_id: "espresso".into(),
//!                 name: "Espresso".into(),
//!                 unit_price: Decimal::new(120, 0),
//!                 quantity: 1,
//!             }],
//!             total_amount: Decimal::new(120, 0),
//!             customer_identity: None,
//!             customer_name: "Ana".into(),
//!             phone_number: None,
//!             address: None,
//!         })
//!         .await?;
//!
//!     let accepted = orders.update_status(order.id, OrderStatus::Accepted).await?;
//!     assert_eq!(accepted.status, OrderStatus::Accepted);
//!     Ok(())
//! }
//! ```

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::OrderClient;
use crate::model::{Order, OrderId};
use actor_framework::ResourceActor;

/// Creates a new Order actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Order>, OrderClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size, OrderId::generate);
    (actor, OrderClient::new(generic_client))
}
