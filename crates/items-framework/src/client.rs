//! # Store Client
//!
//! The typed handle used to talk to a [`ModelStore`](crate::ModelStore).

use crate::error::StoreError;
use crate::message::StoreRequest;
use crate::model::{Loaded, Model};
use crate::pagination::{PageRequest, Paginated};
use crate::query::Query;
use tokio::sync::{mpsc, oneshot};

/// A type-safe client for a `ModelStore`.
///
/// Holds only a channel sender, so it is cheap to clone and share between services and
/// relation loaders. Every call resolves to `Result<…, StoreError>`; a stopped store surfaces
/// as [`StoreError::Closed`] or [`StoreError::Dropped`].
pub struct StoreClient<M: Model> {
    sender: mpsc::Sender<StoreRequest<M>>,
}

impl<M: Model> Clone for StoreClient<M> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<M: Model> StoreClient<M> {
    pub fn new(sender: mpsc::Sender<StoreRequest<M>>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T, StoreError>>) -> StoreRequest<M>,
    ) -> Result<T, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Dropped)?
    }

    pub async fn insert(&self, params: M::Create) -> Result<M::Id, StoreError> {
        self.request(|respond_to| StoreRequest::Insert { params, respond_to })
            .await
    }

    /// Find-or-fail: the record with `id` that also satisfies `query`, with its relations.
    pub async fn find(&self, id: M::Id, query: Query<M>) -> Result<Loaded<M>, StoreError> {
        self.request(|respond_to| StoreRequest::Find {
            id,
            query,
            respond_to,
        })
        .await
    }

    pub async fn paginate(
        &self,
        query: Query<M>,
        page: PageRequest,
    ) -> Result<Paginated<Loaded<M>>, StoreError> {
        self.request(|respond_to| StoreRequest::Paginate {
            query,
            page,
            respond_to,
        })
        .await
    }

    pub async fn all(&self, query: Query<M>) -> Result<Vec<Loaded<M>>, StoreError> {
        self.request(|respond_to| StoreRequest::All { query, respond_to })
            .await
    }

    pub async fn update(&self, id: M::Id, update: M::Update) -> Result<M, StoreError> {
        self.request(|respond_to| StoreRequest::Update {
            id,
            update,
            respond_to,
        })
        .await
    }

    pub async fn delete(&self, id: M::Id) -> Result<(), StoreError> {
        self.request(|respond_to| StoreRequest::Delete { id, respond_to })
            .await
    }
}
