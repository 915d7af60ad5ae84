//! # Mock Store & Testing Guide
//!
//! [`MockStore<M>`] hands out a real [`StoreClient<M>`] whose requests are answered from a
//! queue of expectations instead of a [`ModelStore`](crate::ModelStore). Services under test
//! cannot tell the difference, which makes resolver logic testable without seeding data.
//!
//! ## When to use Mocks vs Real Stores
//!
//! | Feature | MockStore | ModelStore |
//! |---------|-----------|------------|
//! | **Speed** | Instant (in-memory) | Fast (but involves tokio spawn) |
//! | **Determinism** | Scripted responses | Depends on seeded records |
//! | **Queries** | Recorded for assertions | Executed |
//! | **Use Case** | Testing resolver/service logic | Testing filtering, relations, full system |
//! | **Error Injection** | Easy (`return_err`) | Hard (requires specific state) |
//!
//! ## Testing Strategies
//!
//! <details>
//! <summary><b>Pattern 0: Service Logic Test (Pure Mock)</b></summary>
//!
//! ```rust
//! use items_framework::mock::MockStore;
//! use items_framework::{
//!     ApiRequest, FilterParams, ItemsService, Loaded, Model, ResourceContext, ResourceService,
//! };
//! use serde::Serialize;
//!
//! #[derive(Debug, Clone, Serialize)] struct User { id: u32, email: String }
//! #[derive(Debug, thiserror::Error)] #[error("invalid user")] struct UserError;
//!
//! impl Model for User {
//!     type Id = u32; type Create = String; type Update = String; type Error = UserError;
//!     fn id(&self) -> &u32 { &self.id }
//!     fn from_create_params(id: u32, email: String) -> Result<Self, UserError> { Ok(Self { id, email }) }
//!     fn apply_update(&mut self, email: String) -> Result<(), UserError> { self.email = email; Ok(()) }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     // 1. Script the store
//!     let mut mock = MockStore::<User>::new();
//!     mock.expect_find(1)
//!         .return_ok(Loaded::new(User { id: 1, email: "test@example.com".into() }));
//!
//!     // 2. Build the service on the mock's client
//!     let service = ResourceService::new(ResourceContext::new(), mock.client());
//!
//!     // 3. Test Logic
//!     let request = ApiRequest::new("/users/1").with_route("UserController@show");
//!     let item = service.get_item(1, &request, &FilterParams::new(), true).await.unwrap();
//!     assert_eq!(item.unwrap().data().unwrap()["email"], "test@example.com");
//!     mock.verify();
//! }
//! ```
//! </details>
//!
//! <details>
//! <summary><b>Pattern 1: Single Store Test (Real data, no relations)</b></summary>
//!
//! Spawn a [`ModelStore`](crate::ModelStore) with `Relations::none()`, seed it through the
//! client and call the service. See the unit tests in `store.rs`.
//! </details>
//!
//! <details>
//! <summary><b>Pattern 2: Full System Integration Test</b></summary>
//!
//! Start every store with its relation loaders and drive requests through the services.
//! See `tests/integration_test.rs` in the items-sample crate.
//! </details>
//!
//! ## Testing Failure Scenarios
//!
//! ```rust
//! use items_framework::mock::MockStore;
//! use items_framework::{Model, Query, StoreError};
//! # use serde::Serialize;
//! # #[derive(Debug, Clone, Serialize)] struct User { id: u32 }
//! # #[derive(Debug, thiserror::Error)] #[error("invalid")] struct UserError;
//! # impl Model for User {
//! #     type Id = u32; type Create = (); type Update = (); type Error = UserError;
//! #     fn id(&self) -> &u32 { &self.id }
//! #     fn from_create_params(id: u32, _: ()) -> Result<Self, UserError> { Ok(Self { id }) }
//! #     fn apply_update(&mut self, _: ()) -> Result<(), UserError> { Ok(()) }
//! # }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockStore::<User>::new();
//!     let client = mock.client();
//!
//!     // Simulate a store that went away
//!     mock.expect_find(1).return_err(StoreError::Closed);
//!
//!     let result = client.find(1, Query::new()).await;
//!     assert!(matches!(result, Err(StoreError::Closed)));
//! }
//! ```
//!
//! ## Mocking Utilities
//!
//! Use the fluent [`MockStore`] API, or [`create_mock_store`] to get a client plus the raw
//! request receiver and answer requests by hand.

use crate::client::StoreClient;
use crate::error::StoreError;
use crate::message::{Response, StoreRequest};
use crate::model::{Loaded, Model};
use crate::pagination::{PageRequest, Paginated};
use crate::query::Query;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::warn;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// A scripted response, queued in the order requests are expected.
enum Expectation<M: Model> {
    Insert(Result<M::Id, StoreError>),
    Find(M::Id, Result<Loaded<M>, StoreError>),
    Paginate(Result<Paginated<Loaded<M>>, StoreError>),
    All(Result<Vec<Loaded<M>>, StoreError>),
    Update(M::Id, Result<M, StoreError>),
    Delete(M::Id, Result<(), StoreError>),
}

struct MockState<M: Model> {
    expectations: VecDeque<Expectation<M>>,
    queries: Vec<Query<M>>,
    pages: Vec<PageRequest>,
    unexpected: Vec<String>,
}

type Shared<M> = Arc<Mutex<MockState<M>>>;

fn lock<M: Model>(state: &Shared<M>) -> MutexGuard<'_, MockState<M>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A store double with expectation tracking.
///
/// Requests must arrive in the order expectations were queued. A request that does not match
/// the next expectation is answered by dropping its response channel (the caller sees
/// [`StoreError::Dropped`]) and is reported by [`verify`](MockStore::verify).
pub struct MockStore<M: Model> {
    client: StoreClient<M>,
    state: Shared<M>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<M: Model> Default for MockStore<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> MockStore<M> {
    /// Creates a mock store with no expectations. Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<StoreRequest<M>>(100);
        let state: Shared<M> = Arc::new(Mutex::new(MockState {
            expectations: VecDeque::new(),
            queries: Vec::new(),
            pages: Vec::new(),
            unexpected: Vec::new(),
        }));
        let task_state = state.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                answer(&task_state, request);
            }
        });

        Self {
            client: StoreClient::new(sender),
            state,
            _handle: handle,
        }
    }

    /// Returns the client to hand to the code under test.
    pub fn client(&self) -> StoreClient<M> {
        self.client.clone()
    }

    pub fn expect_insert(&mut self) -> ExpectationBuilder<M, M::Id> {
        self.builder(Box::new(Expectation::Insert))
    }

    /// Expects a `find` for `id`, whatever the query.
    pub fn expect_find(&mut self, id: M::Id) -> ExpectationBuilder<M, Loaded<M>> {
        self.builder(Box::new(move |response| Expectation::Find(id, response)))
    }

    pub fn expect_paginate(&mut self) -> ExpectationBuilder<M, Paginated<Loaded<M>>> {
        self.builder(Box::new(Expectation::Paginate))
    }

    pub fn expect_all(&mut self) -> ExpectationBuilder<M, Vec<Loaded<M>>> {
        self.builder(Box::new(Expectation::All))
    }

    pub fn expect_update(&mut self, id: M::Id) -> ExpectationBuilder<M, M> {
        self.builder(Box::new(move |response| Expectation::Update(id, response)))
    }

    pub fn expect_delete(&mut self, id: M::Id) -> ExpectationBuilder<M, ()> {
        self.builder(Box::new(move |response| Expectation::Delete(id, response)))
    }

    fn builder<T>(&self, wrap: Wrap<M, T>) -> ExpectationBuilder<M, T> {
        ExpectationBuilder {
            state: self.state.clone(),
            wrap,
        }
    }

    /// Queries received by `find`, `paginate` and `all`, in arrival order.
    pub fn queries(&self) -> Vec<Query<M>> {
        lock(&self.state).queries.clone()
    }

    /// Page requests received by `paginate`, in arrival order.
    pub fn pages(&self) -> Vec<PageRequest> {
        lock(&self.state).pages.clone()
    }

    /// Panics unless every expectation was consumed and no unexpected request arrived.
    pub fn verify(&self) {
        let state = lock(&self.state);
        if !state.unexpected.is_empty() {
            panic!("Unexpected requests: {:?}", state.unexpected);
        }
        if !state.expectations.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining",
                state.expectations.len()
            );
        }
    }
}

/// Answer `request` from the next queued expectation.
fn answer<M: Model>(state: &Shared<M>, request: StoreRequest<M>) {
    let mut state = lock(state);
    let expectation = state.expectations.pop_front();

    match (request, expectation) {
        (StoreRequest::Insert { respond_to, .. }, Some(Expectation::Insert(response))) => {
            let _ = respond_to.send(response);
        }
        (
            StoreRequest::Find {
                id,
                query,
                respond_to,
            },
            Some(Expectation::Find(expected, response)),
        ) if id == expected => {
            state.queries.push(query);
            let _ = respond_to.send(response);
        }
        (
            StoreRequest::Paginate {
                query,
                page,
                respond_to,
            },
            Some(Expectation::Paginate(response)),
        ) => {
            state.queries.push(query);
            state.pages.push(page);
            let _ = respond_to.send(response);
        }
        (StoreRequest::All { query, respond_to }, Some(Expectation::All(response))) => {
            state.queries.push(query);
            let _ = respond_to.send(response);
        }
        (
            StoreRequest::Update { id, respond_to, .. },
            Some(Expectation::Update(expected, response)),
        ) if id == expected => {
            let _ = respond_to.send(response);
        }
        (
            StoreRequest::Delete { id, respond_to },
            Some(Expectation::Delete(expected, response)),
        ) if id == expected => {
            let _ = respond_to.send(response);
        }
        (request, _) => {
            warn!(?request, "Unexpected request");
            state.unexpected.push(format!("{request:?}"));
        }
    }
}

type Wrap<M, T> = Box<dyn FnOnce(Result<T, StoreError>) -> Expectation<M> + Send>;

/// Completes an expectation with its scripted response.
pub struct ExpectationBuilder<M: Model, T> {
    state: Shared<M>,
    wrap: Wrap<M, T>,
}

impl<M: Model, T> ExpectationBuilder<M, T> {
    pub fn return_ok(self, value: T) {
        self.push(Ok(value));
    }

    pub fn return_err(self, error: StoreError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<T, StoreError>) {
        let expectation = (self.wrap)(response);
        lock(&self.state).expectations.push_back(expectation);
    }
}

// =============================================================================
// RECEIVER HELPERS
// =============================================================================

/// Creates a store client and the receiver its requests arrive on.
///
/// For tests that want to inspect each request and answer it by hand, including answering
/// late or not at all.
pub fn create_mock_store<M: Model>(
    buffer_size: usize,
) -> (StoreClient<M>, mpsc::Receiver<StoreRequest<M>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (StoreClient::new(sender), receiver)
}

/// Next request, if it is a `find`.
pub async fn expect_find<M: Model>(
    receiver: &mut mpsc::Receiver<StoreRequest<M>>,
) -> Option<(M::Id, Query<M>, Response<Loaded<M>>)> {
    match receiver.recv().await {
        Some(StoreRequest::Find {
            id,
            query,
            respond_to,
        }) => Some((id, query, respond_to)),
        _ => None,
    }
}

/// Next request, if it is a `paginate`.
pub async fn expect_paginate<M: Model>(
    receiver: &mut mpsc::Receiver<StoreRequest<M>>,
) -> Option<(Query<M>, PageRequest, Response<Paginated<Loaded<M>>>)> {
    match receiver.recv().await {
        Some(StoreRequest::Paginate {
            query,
            page,
            respond_to,
        }) => Some((query, page, respond_to)),
        _ => None,
    }
}
