//! # Mock Framework & Testing Guide
//!
//! `MockClient<T>` hands out a real [`ResourceClient<T>`] whose requests are answered
//! from a queue of scripted expectations instead of an actor. It lets you test logic that
//! sits *around* a client (error mapping, orchestration, fan-out) deterministically and
//! without any actor state.
//!
//! ## When to use Mocks vs Real Actors
//!
//! | Feature | MockClient | Real Actor |
//! |---------|------------|------------|
//! | **Speed** | Instant (in-memory) | Fast (but involves tokio spawn) |
//! | **Determinism** | Fully scripted | Subject to scheduler |
//! | **State** | None (expectations) | Real state management |
//! | **Error Injection** | Easy (`return_err`) | Hard (requires specific state) |
//!
//! ## Simulating an unavailable store
//!
//! ```rust
//! use actor_framework::mock::MockClient;
//! use actor_framework::{ActorEntity, FrameworkError};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)] struct Seat { id: u32 }
//! #[derive(Debug)] struct SeatCreate;
//! #[derive(Debug)] struct SeatUpdate;
//! #[derive(Debug, thiserror::Error)] #[error("Err")] struct SeatError;
//!
//! #[async_trait]
//! impl ActorEntity for Seat {
//!     type Id = u32; type Create = SeatCreate; type Update = SeatUpdate;
//!     type Query = (); type Context = (); type Error = SeatError;
//!     fn from_create_params(id: u32, _: SeatCreate) -> Result<Self, SeatError> { Ok(Self { id }) }
//!     fn matches(&self, _: &()) -> bool { true }
//!     async fn on_update(&mut self, _: SeatUpdate, _: &()) -> Result<(), SeatError> { Ok(()) }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockClient::<Seat>::new();
//!     let client = mock.client();
//!
//!     mock.expect_get(1).return_err(FrameworkError::ActorClosed);
//!
//!     let result = client.get(1).await;
//!     assert!(matches!(result, Err(FrameworkError::ActorClosed)));
//!     mock.verify();
//! }
//! ```
//!
//! ## Mocking Utilities
//!
//! Use [`create_mock_client`] to get a client plus the raw request receiver, or the fluent
//! [`MockClient`] API. Requests that arrive with no matching expectation make the mock
//! task panic, which surfaces in the test as `FrameworkError::ActorDropped`.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::ResourceRequest;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// A scripted answer for the next request of the matching kind.
enum Expectation<T: ActorEntity> {
    Create(Result<T, FrameworkError>),
    Get(Result<Option<T>, FrameworkError>),
    List(Result<Vec<T>, FrameworkError>),
    Update(Result<T, FrameworkError>),
    Delete(Result<(), FrameworkError>),
    DeleteWhere(Result<usize, FrameworkError>),
}

type Expectations<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

/// A mock client with expectation tracking for fluent testing.
///
/// ```ignore
/// let mut mock = MockClient::<Order>::new();
/// mock.expect_get(order_id.clone()).return_ok(Some(order));
/// mock.expect_update().return_ok(updated);
///
/// let client = OrderClient::new(mock.client());
/// // exercise client...
/// mock.verify(); // every expectation was consumed
/// ```
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    expectations: Expectations<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn answer<R>(respond_to: oneshot::Sender<Result<R, FrameworkError>>, response: Result<R, FrameworkError>) {
    let _ = respond_to.send(response);
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a new mock client with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let expectations: Expectations<T> = Arc::new(Mutex::new(VecDeque::new()));
        let queued = expectations.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = queued.lock().unwrap().pop_front();

                match (request, expectation) {
                    (ResourceRequest::Create { respond_to, .. }, Some(Expectation::Create(r))) => {
                        answer(respond_to, r)
                    }
                    (ResourceRequest::Get { respond_to, .. }, Some(Expectation::Get(r))) => {
                        answer(respond_to, r)
                    }
                    (ResourceRequest::List { respond_to, .. }, Some(Expectation::List(r))) => {
                        answer(respond_to, r)
                    }
                    (ResourceRequest::Update { respond_to, .. }, Some(Expectation::Update(r))) => {
                        answer(respond_to, r)
                    }
                    (ResourceRequest::Delete { respond_to, .. }, Some(Expectation::Delete(r))) => {
                        answer(respond_to, r)
                    }
                    (
                        ResourceRequest::DeleteWhere { respond_to, .. },
                        Some(Expectation::DeleteWhere(r)),
                    ) => answer(respond_to, r),
                    _ => {
                        panic!("Unexpected request or expectation mismatch");
                    }
                }
            }
        });

        Self {
            client: ResourceClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    /// Expects a `create` operation.
    pub fn expect_create(&mut self) -> ExpectationBuilder<T, T> {
        self.builder(Expectation::Create)
    }

    /// Expects a `get` operation. The id is informational; requests are answered in order.
    pub fn expect_get(&mut self, _id: T::Id) -> ExpectationBuilder<T, Option<T>> {
        self.builder(Expectation::Get)
    }

    /// Expects a `list` operation.
    pub fn expect_list(&mut self) -> ExpectationBuilder<T, Vec<T>> {
        self.builder(Expectation::List)
    }

    /// Expects an `update` operation.
    pub fn expect_update(&mut self) -> ExpectationBuilder<T, T> {
        self.builder(Expectation::Update)
    }

    /// Expects a `delete` operation.
    pub fn expect_delete(&mut self, _id: T::Id) -> ExpectationBuilder<T, ()> {
        self.builder(Expectation::Delete)
    }

    /// Expects a `delete_where` operation.
    pub fn expect_delete_where(&mut self) -> ExpectationBuilder<T, usize> {
        self.builder(Expectation::DeleteWhere)
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let remaining = self.expectations.lock().unwrap().len();
        if remaining != 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }

    fn builder<R>(
        &self,
        wrap: fn(Result<R, FrameworkError>) -> Expectation<T>,
    ) -> ExpectationBuilder<T, R> {
        ExpectationBuilder {
            wrap,
            expectations: self.expectations.clone(),
        }
    }
}

/// Builder returned by the `expect_*` methods; finish it with `return_ok` or `return_err`.
pub struct ExpectationBuilder<T: ActorEntity, R> {
    wrap: fn(Result<R, FrameworkError>) -> Expectation<T>,
    expectations: Expectations<T>,
}

impl<T: ActorEntity, R> ExpectationBuilder<T, R> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: R) {
        self.push(Ok(value));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: FrameworkError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<R, FrameworkError>) {
        self.expectations
            .lock()
            .unwrap()
            .push_back((self.wrap)(response));
    }
}

// =============================================================================
// RAW HELPERS
// =============================================================================

/// Creates a client whose requests land on a receiver the test controls.
///
/// Useful when a test must inspect the payload of a request (e.g. which status an
/// update carried) before deciding how to answer it.
pub fn create_mock_client<T: ActorEntity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Create, oneshot::Sender<Result<T, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Update request
pub async fn expect_update<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Update, oneshot::Sender<Result<T, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Update {
            id,
            update,
            respond_to,
        }) => Some((id, update, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a DeleteWhere request
pub async fn expect_delete_where<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Query, oneshot::Sender<Result<usize, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::DeleteWhere { query, respond_to }) => Some((query, respond_to)),
        _ => None,
    }
}
