//! # Store Messages
//!
//! The message types exchanged between a [`StoreClient`](crate::StoreClient) and its
//! [`ModelStore`](crate::ModelStore).

use crate::error::StoreError;
use crate::model::{Loaded, Model};
use crate::pagination::{PageRequest, Paginated};
use crate::query::Query;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by stores.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

/// Internal message type sent to a store.
///
/// The read side mirrors what an ORM query builder offers a controller: find-or-fail through
/// a query, paginate a query, fetch everything a query matches. The write side (insert,
/// update, delete) exists so stores can be seeded and mutated.
#[derive(Debug)]
pub enum StoreRequest<M: Model> {
    Insert {
        params: M::Create,
        respond_to: Response<M::Id>,
    },
    /// Fails with [`StoreError::NotFound`] when no record with `id` satisfies the query.
    Find {
        id: M::Id,
        query: Query<M>,
        respond_to: Response<Loaded<M>>,
    },
    Paginate {
        query: Query<M>,
        page: PageRequest,
        respond_to: Response<Paginated<Loaded<M>>>,
    },
    All {
        query: Query<M>,
        respond_to: Response<Vec<Loaded<M>>>,
    },
    Update {
        id: M::Id,
        update: M::Update,
        respond_to: Response<M>,
    },
    Delete {
        id: M::Id,
        respond_to: Response<()>,
    },
}
