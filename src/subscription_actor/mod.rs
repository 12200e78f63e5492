//! # Subscription Actor
//!
//! The Subscription Store: push endpoints keyed by user identity. The endpoint is the
//! entity's `unique_key`, so the actor itself refuses a second registration of the same
//! endpoint.
//!
//! - [`entity`] - validation and query matching for [`PushSubscription`]
//! - [`error`] - [`SubscriptionError`]

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::SubscriptionClient;
use crate::model::{PushSubscription, SubscriptionId};
use actor_framework::ResourceActor;

/// Creates a new Subscription actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<PushSubscription>, SubscriptionClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size, SubscriptionId::generate);
    (actor, SubscriptionClient::new(generic_client))
}
