//! # System Lifecycle & Orchestration
//!
//! Two layers live here:
//!
//! - [`OrderSystem`] starts the store actors, wires the Event Bus and push notifier
//!   onto them and shuts everything down in order.
//! - [`OrderLifecycle`] is the controller every order transition goes through.
//!
//! ## Wiring
//!
//! ```rust,ignore
//! let (order_actor, orders) = order_actor::new(buffer);
//! let (subscription_actor, subscriptions) = subscription_actor::new(buffer);
//! tokio::spawn(order_actor.run(()));
//! tokio::spawn(subscription_actor.run(()));
//!
//! let bus = EventBus::new(capacity);
//! let notifier = Notifier::new(subscriptions.clone(), dispatcher);
//! let lifecycle = OrderLifecycle::new(orders.clone(), bus.clone(), notifier, composer, admin, TaskTracker::new());
//! ```
//!
//! Neither store depends on the other, so both actors run with `()` as context.
//!
//! ## Graceful Shutdown
//!
//! 1. **Close the tracker** and wait for push fan-outs still in flight
//! 2. **Drop all clients** so the actors' channels close
//! 3. **Await the actor tasks**
//!
//! ## Ordering
//!
//! For one transition the store write happens before any broadcast, and the broadcast
//! before any push is attempted. A client reacting to a live event can therefore always
//! re-fetch the new state.

pub mod controller;
pub mod order_system;

pub use controller::OrderLifecycle;
pub use order_system::OrderSystem;
