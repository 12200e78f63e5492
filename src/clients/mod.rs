//! Typed wrappers around the generic `ResourceClient`s of each store actor.

pub mod order_client;
pub mod subscription_client;

pub use order_client::OrderClient;
pub use subscription_client::{SubscribeOutcome, SubscriptionClient};
