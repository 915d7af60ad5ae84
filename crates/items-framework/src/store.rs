//! # Model Store
//!
//! This module defines the `ModelStore`, the component that owns the records of one model and
//! answers queries about them. It is the "server" half of the store: a Tokio task processing
//! [`StoreRequest`]s sequentially, so the record map needs no locking.

use crate::client::StoreClient;
use crate::error::StoreError;
use crate::message::StoreRequest;
use crate::model::{model_name, Loaded, Model};
use crate::pagination::{PageRequest, Paginated};
use crate::query::Query;
use crate::relation::Relations;
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The in-memory query layer for one model.
///
/// # Usage Pattern
///
/// 1.  **Create**: `ModelStore::new()` returns the store (server) and a [`StoreClient`].
/// 2.  **Wire**: pass the model's relation loaders into `store.run(relations)`.
/// 3.  **Run**: spawn the run loop in a background task.
///
/// ```rust
/// use items_framework::{Model, ModelStore, PageRequest, Query, Relations};
/// use serde::Serialize;
///
/// #[derive(Debug, Clone, Serialize)]
/// struct Note { id: u32, text: String }
/// #[derive(Debug, thiserror::Error)] #[error("invalid note")] struct NoteError;
///
/// impl Model for Note {
///     type Id = u32;
///     type Create = String;
///     type Update = String;
///     type Error = NoteError;
///     fn id(&self) -> &u32 { &self.id }
///     fn from_create_params(id: u32, text: String) -> Result<Self, NoteError> { Ok(Self { id, text }) }
///     fn apply_update(&mut self, text: String) -> Result<(), NoteError> { self.text = text; Ok(()) }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (store, client) = ModelStore::<Note>::new(10);
///     tokio::spawn(store.run(Relations::none()));
///
///     client.insert("first".to_string()).await.unwrap();
///     let page = client.paginate(Query::new(), PageRequest::new(1, 10)).await.unwrap();
///     assert_eq!(page.total(), 1);
/// }
/// ```
///
/// # Operations
///
/// * **Insert**: allocates the next id from a counter starting at 1, builds the record with
///   `Model::from_create_params` and stores it.
/// * **Find**: the record with the id, provided it satisfies the query's conditions; eager
///   loads the query's relations. A miss is [`StoreError::NotFound`].
/// * **Paginate**: filters and sorts, counts, slices out the requested page and eager loads
///   relations for that page only. Zero items per page means `Model::PER_PAGE`.
/// * **All**: like paginate, without slicing.
/// * **Update** / **Delete**: mutate by id, [`StoreError::NotFound`] on a miss.
pub struct ModelStore<M: Model> {
    receiver: mpsc::Receiver<StoreRequest<M>>,
    records: BTreeMap<M::Id, M>,
    next_id: u32,
}

impl<M: Model> ModelStore<M> {
    /// Creates a new `ModelStore` and its associated `StoreClient`.
    ///
    /// `buffer_size` is the capacity of the request channel; callers wait when it is full.
    pub fn new(buffer_size: usize) -> (Self, StoreClient<M>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let store = Self {
            receiver,
            records: BTreeMap::new(),
            next_id: 1,
        };
        (store, StoreClient::new(sender))
    }

    /// Runs the store's event loop until every client has been dropped.
    pub async fn run(mut self, relations: Relations<M>) {
        let model = model_name::<M>();
        info!(model, relations = relations.names().count(), "Store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Insert { params, respond_to } => {
                    debug!(model, ?params, "Insert");
                    let _ = respond_to.send(self.insert(params));
                }
                StoreRequest::Find {
                    id,
                    query,
                    respond_to,
                } => {
                    debug!(model, %id, ?query, "Find");
                    let result = match self.find(&id, &query) {
                        Ok(record) => load_one(record, query.relations(), &relations).await,
                        Err(e) => Err(e),
                    };
                    if let Err(e) = &result {
                        warn!(model, %id, error = %e, "Find failed");
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Paginate {
                    query,
                    page,
                    respond_to,
                } => {
                    debug!(model, ?query, ?page, "Paginate");
                    let result = self.paginate(&query, page, &relations).await;
                    match &result {
                        Ok(page) => debug!(model, total = page.total(), "Paginated"),
                        Err(e) => warn!(model, error = %e, "Paginate failed"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::All { query, respond_to } => {
                    debug!(model, ?query, "All");
                    let result = match query.apply(self.records.values()) {
                        Ok(records) => load_many(records, query.relations(), &relations).await,
                        Err(e) => Err(e),
                    };
                    if let Err(e) = &result {
                        warn!(model, error = %e, "All failed");
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(model, %id, ?update, "Update");
                    let result = match self.records.get_mut(&id) {
                        Some(record) => match record.apply_update(update) {
                            Ok(()) => {
                                info!(model, %id, "Updated");
                                Ok(record.clone())
                            }
                            Err(e) => {
                                warn!(model, %id, error = %e, "Update failed");
                                Err(StoreError::Model(Box::new(e)))
                            }
                        },
                        None => Err(not_found::<M>(&id)),
                    };
                    let _ = respond_to.send(result);
                }
                StoreRequest::Delete { id, respond_to } => {
                    debug!(model, %id, "Delete");
                    let result = match self.records.remove(&id) {
                        Some(_) => {
                            info!(model, %id, size = self.records.len(), "Deleted");
                            Ok(())
                        }
                        None => Err(not_found::<M>(&id)),
                    };
                    let _ = respond_to.send(result);
                }
            }
        }

        info!(model, size = self.records.len(), "Shutdown");
    }

    fn insert(&mut self, params: M::Create) -> Result<M::Id, StoreError> {
        let model = model_name::<M>();
        let Some(next_id) = self.next_id.checked_add(1) else {
            warn!(model, "Insert failed, ids exhausted");
            return Err(StoreError::IdsExhausted(model));
        };
        let id = M::Id::from(self.next_id);
        match M::from_create_params(id.clone(), params) {
            Ok(record) => {
                self.next_id = next_id;
                self.records.insert(id.clone(), record);
                info!(model, %id, size = self.records.len(), "Inserted");
                Ok(id)
            }
            Err(e) => {
                warn!(model, error = %e, "Insert failed");
                Err(StoreError::Model(Box::new(e)))
            }
        }
    }

    fn find(&self, id: &M::Id, query: &Query<M>) -> Result<M, StoreError> {
        match self.records.get(id) {
            Some(record) if query.matches_record(record)? => Ok(record.clone()),
            _ => Err(not_found::<M>(id)),
        }
    }

    async fn paginate(
        &self,
        query: &Query<M>,
        page: PageRequest,
        relations: &Relations<M>,
    ) -> Result<Paginated<Loaded<M>>, StoreError> {
        let per_page = if page.per_page == 0 {
            M::PER_PAGE
        } else {
            page.per_page
        };
        let page = PageRequest::new(page.page, per_page);
        let matching = query.apply(self.records.values())?;
        let total = matching.len();
        let slice: Vec<M> = matching
            .into_iter()
            .skip(page.offset())
            .take(page.per_page)
            .collect();
        let items = load_many(slice, query.relations(), relations).await?;
        Ok(Paginated::new(items, total, page.per_page, page.page))
    }
}

fn not_found<M: Model>(id: &M::Id) -> StoreError {
    StoreError::NotFound {
        model: model_name::<M>(),
        id: id.to_string(),
    }
}

async fn load_one<M: Model>(
    record: M,
    names: &[String],
    relations: &Relations<M>,
) -> Result<Loaded<M>, StoreError> {
    let mut loaded = Loaded::new(record);
    for name in names {
        let loader = relations
            .get(name)
            .ok_or_else(|| StoreError::UnknownRelation {
                model: model_name::<M>(),
                relation: name.clone(),
            })?;
        let value = loader.load(&loaded.record).await?;
        loaded.relations.insert(name.clone(), value);
    }
    Ok(loaded)
}

async fn load_many<M: Model>(
    records: Vec<M>,
    names: &[String],
    relations: &Relations<M>,
) -> Result<Vec<Loaded<M>>, StoreError> {
    let mut loaded = Vec::with_capacity(records.len());
    for record in records {
        loaded.push(load_one(record, names, relations).await?);
    }
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::{BelongsTo, HasMany};
    use serde::Serialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Author {
        id: u32,
        name: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Post {
        id: u32,
        author_id: u32,
        title: String,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("invalid: {0}")]
    struct Invalid(String);

    impl Model for Author {
        type Id = u32;
        type Create = String;
        type Update = String;
        type Error = Invalid;

        fn id(&self) -> &u32 {
            &self.id
        }
        fn from_create_params(id: u32, name: String) -> Result<Self, Invalid> {
            if name.is_empty() {
                return Err(Invalid("empty name".into()));
            }
            Ok(Self { id, name })
        }
        fn apply_update(&mut self, name: String) -> Result<(), Invalid> {
            self.name = name;
            Ok(())
        }
    }

    impl Model for Post {
        type Id = u32;
        type Create = (u32, String);
        type Update = String;
        type Error = Invalid;
        const PER_PAGE: usize = 2;

        fn id(&self) -> &u32 {
            &self.id
        }
        fn from_create_params(id: u32, (author_id, title): (u32, String)) -> Result<Self, Invalid> {
            Ok(Self { id, author_id, title })
        }
        fn apply_update(&mut self, title: String) -> Result<(), Invalid> {
            self.title = title;
            Ok(())
        }
    }

    #[tokio::test]
    async fn insert_allocates_sequential_ids_and_rejects_invalid_records() {
        let (store, client) = ModelStore::<Author>::new(10);
        tokio::spawn(store.run(Relations::none()));

        assert_eq!(client.insert("Ada".into()).await.unwrap(), 1);
        assert_eq!(client.insert("Grace".into()).await.unwrap(), 2);
        assert!(matches!(
            client.insert(String::new()).await,
            Err(StoreError::Model(_))
        ));
        // a rejected insert does not burn an id
        assert_eq!(client.insert("Linus".into()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn find_honours_query_conditions() {
        let (store, client) = ModelStore::<Author>::new(10);
        tokio::spawn(store.run(Relations::none()));
        client.insert("Ada".into()).await.unwrap();

        let found = client.find(1, Query::new()).await.unwrap();
        assert_eq!(found.record.name, "Ada");

        let filtered = client.find(1, Query::new().where_eq("name", "Grace")).await;
        assert!(matches!(filtered, Err(StoreError::NotFound { .. })));

        let missing = client.find(42, Query::new()).await;
        assert!(matches!(missing, Err(e) if e.is_not_found()));
    }

    #[tokio::test]
    async fn paginate_slices_and_zero_per_page_uses_model_default() {
        let (store, client) = ModelStore::<Post>::new(10);
        tokio::spawn(store.run(Relations::none()));
        for n in 1..=5 {
            client.insert((1, format!("post {n}"))).await.unwrap();
        }

        let page = client.paginate(Query::new(), PageRequest::new(2, 2)).await.unwrap();
        assert_eq!(page.total(), 5);
        assert_eq!(page.current_page(), 2);
        let ids: Vec<u32> = page.items().iter().map(|p| p.record.id).collect();
        assert_eq!(ids, vec![3, 4]);

        let page = client.paginate(Query::new(), PageRequest::new(1, 0)).await.unwrap();
        assert_eq!(page.per_page(), 2);
        assert_eq!(page.items().len(), 2);

        let beyond = client.paginate(Query::new(), PageRequest::new(9, 2)).await.unwrap();
        assert!(beyond.items().is_empty());
        assert_eq!(beyond.total(), 5);
    }

    #[tokio::test]
    async fn huge_page_is_empty_and_store_keeps_serving() {
        let (store, client) = ModelStore::<Post>::new(10);
        tokio::spawn(store.run(Relations::none()));
        for n in 1..=3 {
            client.insert((1, format!("post {n}"))).await.unwrap();
        }

        for page in [PageRequest::new(usize::MAX, 2), PageRequest::new(2, usize::MAX)] {
            let empty = client.paginate(Query::new(), page).await.unwrap();
            assert!(empty.items().is_empty());
            assert_eq!(empty.total(), 3);
            assert_eq!(empty.from(), None);
        }

        let first = client.paginate(Query::new(), PageRequest::new(1, 2)).await.unwrap();
        assert_eq!(first.items().len(), 2);
    }

    #[tokio::test]
    async fn exhausted_ids_fail_the_insert_without_stopping_the_store() {
        let (mut store, client) = ModelStore::<Author>::new(10);
        store.next_id = u32::MAX - 1;
        tokio::spawn(store.run(Relations::none()));

        assert_eq!(client.insert("Ada".into()).await.unwrap(), u32::MAX - 1);
        let exhausted = client.insert("Grace".into()).await;
        assert!(matches!(exhausted, Err(StoreError::IdsExhausted("Author"))));

        let ada = client.find(u32::MAX - 1, Query::new()).await.unwrap();
        assert_eq!(ada.record.name, "Ada");
    }

    #[tokio::test]
    async fn eager_loads_registered_relations() {
        let (author_store, authors) = ModelStore::<Author>::new(10);
        let (post_store, posts) = ModelStore::<Post>::new(10);
        tokio::spawn(post_store.run(Relations::none()));
        tokio::spawn(author_store.run(
            Relations::none().register("posts", HasMany::new(posts.clone(), "author_id", |a: &Author| json!(a.id))),
        ));

        authors.insert("Ada".into()).await.unwrap();
        posts.insert((1, "Notes".into())).await.unwrap();
        posts.insert((2, "Elsewhere".into())).await.unwrap();

        let ada = authors.find(1, Query::new().with(["posts"])).await.unwrap();
        assert_eq!(
            ada.relation("posts"),
            Some(&json!([{ "id": 1, "author_id": 1, "title": "Notes" }]))
        );
    }

    #[tokio::test]
    async fn belongs_to_loads_null_for_missing_parent() {
        let (author_store, authors) = ModelStore::<Author>::new(10);
        let (post_store, posts) = ModelStore::<Post>::new(10);
        tokio::spawn(author_store.run(Relations::none()));
        tokio::spawn(post_store.run(
            Relations::none().register("author", BelongsTo::new(authors.clone(), |p: &Post| Some(p.author_id))),
        ));

        authors.insert("Ada".into()).await.unwrap();
        posts.insert((1, "Notes".into())).await.unwrap();
        posts.insert((9, "Orphan".into())).await.unwrap();

        let all = posts.all(Query::new().with(["author"])).await.unwrap();
        assert_eq!(all[0].relation("author"), Some(&json!({ "id": 1, "name": "Ada" })));
        assert_eq!(all[1].relation("author"), Some(&serde_json::Value::Null));
        assert_eq!(
            serde_json::to_value(&all[0]).unwrap(),
            json!({ "id": 1, "author_id": 1, "title": "Notes", "author": { "id": 1, "name": "Ada" } })
        );
    }

    #[tokio::test]
    async fn unknown_relation_fails_only_when_records_are_loaded() {
        let (store, client) = ModelStore::<Author>::new(10);
        tokio::spawn(store.run(Relations::none()));

        let empty = client.all(Query::new().with(["books"])).await.unwrap();
        assert!(empty.is_empty());

        client.insert("Ada".into()).await.unwrap();
        let result = client.all(Query::new().with(["books"])).await;
        assert!(matches!(
            result,
            Err(StoreError::UnknownRelation { relation, .. }) if relation == "books"
        ));
    }

    #[tokio::test]
    async fn update_and_delete_by_id() {
        let (store, client) = ModelStore::<Author>::new(10);
        tokio::spawn(store.run(Relations::none()));
        client.insert("Ada".into()).await.unwrap();

        let updated = client.update(1, "Ada Lovelace".into()).await.unwrap();
        assert_eq!(updated.name, "Ada Lovelace");

        client.delete(1).await.unwrap();
        assert!(matches!(client.delete(1).await, Err(StoreError::NotFound { .. })));
        assert!(matches!(client.update(1, "x".into()).await, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn dropped_store_reports_closed() {
        let (store, client) = ModelStore::<Author>::new(10);
        drop(store);
        assert!(matches!(client.insert("Ada".into()).await, Err(StoreError::Closed)));
    }
}
