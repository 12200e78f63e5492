//! # ActorEntity Trait
//!
//! The `ActorEntity` trait is the contract every stored resource implements to be managed
//! by the generic [`ResourceActor`](crate::ResourceActor). It fixes the id, the create and
//! update DTOs, the query type used for listing and bulk deletes, the injected context and
//! the error type, and provides async lifecycle hooks.
//!
//! # Provided Methods (Hooks)
//! - [`ActorEntity::on_create`]
//! - [`ActorEntity::on_delete`]
//! - [`ActorEntity::unique_key`]
//!
//! The defaults do nothing, so a plain record only has to implement construction,
//! updates and query matching.

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any resource entity must implement to be managed by ResourceActor.
///
/// # Async & Context
/// Hooks are `#[async_trait]` so they may call other actors. The `Context` type is
/// injected into every hook when the actor is started (`run(context)`), not when it is
/// constructed, which lets actors be wired in any order.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// The unique identifier for this entity. Ids are minted by the closure handed to
    /// [`ResourceActor::new`](crate::ResourceActor::new).
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// The data required to create a new instance.
    type Create: Send + Sync + Debug;

    /// The data required to update an existing instance.
    type Update: Send + Sync + Debug;

    /// Selection criteria for `List` and `DeleteWhere` requests.
    type Query: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the actor.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync;

    /// The error type for this entity.
    ///
    /// One enum per actor rather than one per message: clients match on a single
    /// `OrderError` instead of a family of per-operation errors.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the full Entity from the ID and Payload.
    /// This is called synchronously before `on_create`, and is the place for input
    /// validation that needs no outside information.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Whether this entity is selected by `query`.
    fn matches(&self, query: &Self::Query) -> bool;

    /// Natural de-duplication key. When `Some`, the actor refuses to store a second entity
    /// with the same key and answers [`FrameworkError::AlreadyExists`](crate::FrameworkError::AlreadyExists).
    fn unique_key(&self) -> Option<String> {
        None
    }

    // --- Lifecycle Hooks (Async) ---

    /// Called after the entity is constructed and before it is stored.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when an update request is received. The entity mutates itself; the actor
    /// only keeps the change if this returns `Ok`.
    async fn on_update(
        &mut self,
        update: Self::Update,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Called immediately before the entity is removed from the store.
    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }
}
