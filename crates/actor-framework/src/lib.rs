//! # Actor Framework
//!
//! Building blocks for resource-oriented actor systems on Tokio. Every stored resource
//! type gets its own actor: a task that exclusively owns the records of that type and
//! serves create / read / list / update / delete requests arriving over a channel.
//!
//! ## Architecture Overview
//!
//! 1. **Entity Layer** ([`ActorEntity`]) - the record, its DTOs, validation and query matching
//! 2. **Runtime Layer** ([`ResourceActor`]) - message loop and in-memory store
//! 3. **Interface Layer** ([`ResourceClient`], [`ActorClient`]) - typed, cloneable handles
//!
//! ## Concurrency Model
//!
//! - Each actor runs in its own Tokio task
//! - Requests to one actor are processed **sequentially**, so two updates to the same id
//!   are linearized without any lock
//! - Different actors run in **parallel**
//!
//! ## Context Injection
//!
//! Dependencies are handed to `run(context)` rather than `new()`, so actors can be
//! constructed first and wired afterwards.
//!
//! ## Testing
//!
//! [`mock::MockClient`] answers a real `ResourceClient` from scripted expectations. See the
//! [`mock`] module.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod tracing;

// Re-export core types for convenience
pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response};
