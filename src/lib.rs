//! # Cafe Orders
//!
//! Order lifecycle and real-time notification service for a cafe.
//!
//! - [`model`] - orders and push subscriptions
//! - [`order_actor`], [`subscription_actor`] - the two stores, one actor each
//! - [`clients`] - typed handles on the stores
//! - [`notify`] - notification text, web push delivery and per-user fan-out
//! - [`bus`] - rooms of live connections
//! - [`lifecycle`] - the order controller and system wiring
//! - [`server`] - HTTP and WebSocket adapters
//! - [`config`] - environment configuration

pub mod bus;
pub mod clients;
pub mod config;
pub mod lifecycle;
pub mod model;
pub mod notify;
pub mod order_actor;
pub mod server;
pub mod subscription_actor;
