//! # ActorClient Trait
//!
//! Common interface for resource-specific clients: default `get` and `delete` built on
//! top of the wrapped [`ResourceClient`], with framework errors mapped into the
//! resource's own error type.
use crate::{ActorEntity, FrameworkError, ResourceClient};
use async_trait::async_trait;

/// Trait for resource-specific clients to inherit standard read and delete operations.
///
/// # Example
///
/// ```rust
/// use actor_framework::{ActorClient, ActorEntity, FrameworkError, ResourceClient};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)] struct Table { id: u32 }
/// #[derive(Debug)] struct TableCreate;
/// #[derive(Debug)] struct TableUpdate;
/// #[derive(Debug, thiserror::Error)] #[error("{0}")] struct TableError(String);
///
/// #[async_trait]
/// impl ActorEntity for Table {
///     type Id = u32; type Create = TableCreate; type Update = TableUpdate;
///     type Query = (); type Context = (); type Error = TableError;
///     fn from_create_params(id: u32, _: TableCreate) -> Result<Self, TableError> { Ok(Self { id }) }
///     fn matches(&self, _: &()) -> bool { true }
///     async fn on_update(&mut self, _: TableUpdate, _: &()) -> Result<(), TableError> { Ok(()) }
/// }
///
/// struct TableClient { inner: ResourceClient<Table> }
///
/// #[async_trait]
/// impl ActorClient<Table> for TableClient {
///     type Error = TableError;
///     fn inner(&self) -> &ResourceClient<Table> { &self.inner }
///     fn map_error(e: FrameworkError) -> TableError { TableError(e.to_string()) }
/// }
///
/// async fn usage(client: TableClient) {
///     // get() and delete() come for free
///     let _ = client.get(1).await;
///     let _ = client.delete(1).await;
/// }
/// ```
#[async_trait]
pub trait ActorClient<T: ActorEntity>: Send + Sync {
    /// The resource-specific error type.
    type Error: Send + Sync;

    /// Access the inner generic ResourceClient.
    fn inner(&self) -> &ResourceClient<T>;

    /// Map framework errors to the specific resource error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Fetch an entity by ID.
    #[tracing::instrument(skip(self))]
    async fn get(&self, id: T::Id) -> Result<Option<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(id).await.map_err(Self::map_error)
    }

    /// Delete an entity by ID.
    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: T::Id) -> Result<(), Self::Error> {
        tracing::debug!("Sending request");
        self.inner().delete(id).await.map_err(Self::map_error)
    }
}
