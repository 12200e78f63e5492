//! # Push Notifications
//!
//! - [`composer`] - what a notification says
//! - [`dispatcher`] - sending one payload to one endpoint ([`PushDispatcher`], [`PushTransport`])
//! - [`webpush`] - the real transport: VAPID + `aes128gcm` over HTTP
//! - [`notifier`] - fan-out to every endpoint of a user, with expiry pruning
//! - [`recording`] - scripted in-memory transport for tests
//!
//! Push is a best-effort overlay: nothing in here returns an error to the order
//! lifecycle.

pub mod composer;
pub mod dispatcher;
pub mod notifier;
pub mod recording;
pub mod webpush;

pub use composer::{Audience, NotificationComposer, NotificationPayload};
pub use dispatcher::{DeliveryOutcome, PushDispatcher, PushTransport};
pub use notifier::{FanoutReport, Notifier};
