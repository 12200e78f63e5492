//! # Generic Actor Server
//!
//! This module defines the `ResourceActor`, the component that owns the state of one
//! resource type. It is the "server" side of the actor model: requests arrive over an
//! mpsc channel and are processed one at a time, so the store needs no locks and every
//! read-modify-write on a single id is linearized.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::ResourceRequest;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The generic actor that manages a collection of entities.
///
/// # Usage Pattern
///
/// 1.  **Create**: `ResourceActor::new(buffer, next_id)` returns the actor and its client.
/// 2.  **Wire**: pass dependencies into `actor.run(context)`.
/// 3.  **Run**: spawn the run loop in a background task.
///
/// ```rust
/// use actor_framework::{ActorEntity, ResourceActor};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)] struct Note { id: u32, text: String }
/// #[derive(Debug)] struct NoteCreate(String);
/// #[derive(Debug)] struct NoteUpdate(String);
/// #[derive(Debug, thiserror::Error)] #[error("note error")] struct NoteError;
///
/// #[async_trait]
/// impl ActorEntity for Note {
///     type Id = u32;
///     type Create = NoteCreate;
///     type Update = NoteUpdate;
///     type Query = ();
///     type Context = ();
///     type Error = NoteError;
///
///     fn from_create_params(id: u32, p: NoteCreate) -> Result<Self, NoteError> {
///         Ok(Self { id, text: p.0 })
///     }
///     fn matches(&self, _: &()) -> bool { true }
///     async fn on_update(&mut self, u: NoteUpdate, _: &()) -> Result<(), NoteError> {
///         self.text = u.0;
///         Ok(())
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let mut next = 0;
///     let (actor, client) = ResourceActor::<Note>::new(10, move || { next += 1; next });
///     tokio::spawn(actor.run(()));
///
///     let note = client.create(NoteCreate("hello".into())).await.unwrap();
///     assert_eq!(note.id, 1);
/// }
/// ```
///
/// # Operations
///
/// * **Create**: mints an id, builds the entity with `from_create_params`, runs `on_create`,
///   rejects duplicates of `unique_key`, stores it and answers with the stored entity.
/// * **Get**: clone of the entity or `None`.
/// * **List**: clones of every entity whose `matches(query)` is true.
/// * **Update**: runs `on_update` against a copy and only commits the copy on success.
/// * **Delete**: runs `on_delete`, then removes.
/// * **DeleteWhere**: removes every match and answers with how many were removed.
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    next_id: Box<dyn FnMut() -> T::Id + Send>,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates a new `ResourceActor` and its associated `ResourceClient`.
    ///
    /// * `buffer_size` - capacity of the request channel; callers wait when it is full.
    /// * `next_id` - id generator, called once per successful `Create` attempt.
    pub fn new(
        buffer_size: usize,
        next_id: impl FnMut() -> T::Id + Send + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_id: Box::new(next_id),
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    /// Runs the actor's event loop, processing messages until every client is dropped.
    ///
    /// The `context` argument is injected into every entity hook.
    pub async fn run(mut self, context: T::Context) {
        // "Order" instead of "cafe_orders::model::order::Order"
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    debug!(entity_type, ?params, "Create");
                    let result = self.create(params, &context).await;
                    match &result {
                        Ok(_) => info!(entity_type, size = self.store.len(), "Created"),
                        Err(e) => warn!(entity_type, error = %e, "Create failed"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    debug!(entity_type, %id, found = item.is_some(), "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::List { query, respond_to } => {
                    let items: Vec<T> = self
                        .store
                        .values()
                        .filter(|item| item.matches(&query))
                        .cloned()
                        .collect();
                    debug!(entity_type, ?query, count = items.len(), "List");
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?update, "Update");
                    let Some(current) = self.store.get(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    let mut candidate = current.clone();
                    if let Err(e) = candidate.on_update(update, &context).await {
                        warn!(entity_type, %id, error = %e, "Update failed");
                        let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        continue;
                    }
                    self.store.insert(id.clone(), candidate.clone());
                    info!(entity_type, %id, "Updated");
                    let _ = respond_to.send(Ok(candidate));
                }
                ResourceRequest::Delete { id, respond_to } => {
                    debug!(entity_type, %id, "Delete");
                    let Some(item) = self.store.get(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    if let Err(e) = item.on_delete(&context).await {
                        warn!(entity_type, %id, error = %e, "on_delete failed");
                        let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        continue;
                    }
                    self.store.remove(&id);
                    info!(entity_type, %id, size = self.store.len(), "Deleted");
                    let _ = respond_to.send(Ok(()));
                }
                ResourceRequest::DeleteWhere { query, respond_to } => {
                    let before = self.store.len();
                    self.store.retain(|_, item| !item.matches(&query));
                    let removed = before - self.store.len();
                    info!(entity_type, ?query, removed, size = self.store.len(), "Deleted matching");
                    let _ = respond_to.send(Ok(removed));
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }

    async fn create(&mut self, params: T::Create, context: &T::Context) -> Result<T, FrameworkError> {
        let id = (self.next_id)();
        let mut item =
            T::from_create_params(id.clone(), params).map_err(|e| FrameworkError::EntityError(Box::new(e)))?;
        item.on_create(context)
            .await
            .map_err(|e| FrameworkError::EntityError(Box::new(e)))?;

        if let Some(key) = item.unique_key() {
            let taken = self
                .store
                .values()
                .any(|existing| existing.unique_key().as_deref() == Some(key.as_str()));
            if taken {
                return Err(FrameworkError::AlreadyExists(key));
            }
        }

        self.store.insert(id, item.clone());
        Ok(item)
    }
}
