//! # Items Service
//!
//! [`ItemsService`] is the resource query resolver: given an [`ApiRequest`] and the resource's
//! [`ResourceContext`], it builds the base query, adds the relations to eager load, runs it
//! against the model's store and shapes the response.
//!
//! ## Pipeline
//!
//! ```text
//! request ──► action (route "Controller@action")
//!         ──► base query (FilterScope, or unfiltered) ──► base_query_filter hook
//!         ──► relations (configured for the action + ?expand=)
//!         ──► store: paginate / all / find
//!         ──► transformer + additional hook, or raw array form
//! ```
//!
//! Everything but `context()` and `store()` has a default, so most resources use
//! [`ResourceService`] as is. A resource that needs to scope every query (soft deletes,
//! tenancy) implements the trait itself and overrides
//! [`base_query_filter`](ItemsService::base_query_filter).
//!
//! ## Response shapes
//!
//! | Call | Transformer | Result |
//! |------|-------------|--------|
//! | `get_items` | none | [`ItemsPage::Raw`]: the page's array form |
//! | `get_items` | configured | [`ItemsPage::Transformed`]: `{data, links, meta, ...additional}` |
//! | `get_item` on `update` / `destroy` | either | [`ItemResponse::Bare`]: the `data` value alone |
//! | `get_item` otherwise | either | [`ItemResponse::Envelope`]: `{data, ...additional}` |
//! | `get_item`, missing id | either | `None` |

use crate::client::StoreClient;
use crate::error::ItemsError;
use crate::model::{model_name, Model};
use crate::pagination::{PageRequest, Paginated};
use crate::query::Query;
use crate::request::{Action, ApiRequest, FilterParams};
use crate::resource::ResourceContext;
use crate::transform::TransformedPage;
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Result of a list call.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemsPage {
    /// Length-aware array form of the page (no transformer configured).
    Raw(Value),
    Transformed(TransformedPage),
}

impl ItemsPage {
    pub fn into_value(self) -> Result<Value, serde_json::Error> {
        match self {
            ItemsPage::Raw(value) => Ok(value),
            ItemsPage::Transformed(page) => page.to_value(),
        }
    }
}

/// Result of an item call.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemResponse {
    /// `{ "data": ..., ...additional }`
    Envelope(Map<String, Value>),
    /// The `data` value alone, returned for mutations.
    Bare(Value),
}

impl ItemResponse {
    pub fn data(&self) -> Option<&Value> {
        match self {
            ItemResponse::Envelope(map) => map.get("data"),
            ItemResponse::Bare(value) => Some(value),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            ItemResponse::Envelope(map) => Value::Object(map),
            ItemResponse::Bare(value) => value,
        }
    }
}

/// Generic list and item resolution for a resource backed by a [`StoreClient`].
#[async_trait]
pub trait ItemsService<M: Model>: Send + Sync {
    fn context(&self) -> &ResourceContext<M>;

    fn store(&self) -> &StoreClient<M>;

    /// Scope applied to every filtered query. Identity by default.
    fn base_query_filter(&self, query: Query<M>) -> Query<M> {
        query
    }

    /// True when base queries are built through the model's `FilterScope`.
    fn supports_filter(&self) -> bool {
        self.context().filter().is_some()
    }

    /// `limit` from the request, else the resource default.
    ///
    /// An unparseable `limit` is 0, which the store reads as "the model's own page size".
    fn page_size(&self, request: &ApiRequest) -> usize {
        match request.get("limit") {
            Some(limit) => limit.trim().parse().unwrap_or(0),
            None => self.context().default_page_size(),
        }
    }

    /// Relations to eager load for `action`, followed by the `expand` parameter.
    fn relations(&self, action: &Action, request: &ApiRequest) -> Vec<String> {
        if action.is_mutation() {
            return Vec::new();
        }
        let mut relations = self.context().relations().for_action(action);
        relations.extend(request.expand());
        relations
    }

    /// Filtered (when supported) and scoped query, before relations are added.
    fn base_query(&self, request: &ApiRequest, params: &FilterParams) -> Query<M> {
        let query = match self.context().filter() {
            Some(filter) => filter(request, params),
            None => Query::new(),
        };
        self.base_query_filter(query)
    }

    /// Resolve a list request.
    ///
    /// With `paginate = false` every matching record comes back as a single page.
    ///
    /// # Errors
    /// [`ItemsError::MissingRoute`] / [`ItemsError::InvalidRoute`] when no action can be
    /// derived; store errors otherwise. An empty result is an empty page.
    #[tracing::instrument(skip(self, request, params), fields(resource = model_name::<M>(), path = request.path()))]
    async fn get_items(
        &self,
        request: &ApiRequest,
        params: &FilterParams,
        paginate: bool,
    ) -> Result<ItemsPage, ItemsError> {
        let action = request.action()?;
        let relations = self.relations(&action, request);
        info!(%action, ?relations, "Resolving list");

        let mut query = self.base_query(request, params);
        if !relations.is_empty() {
            query = query.with(relations);
        }

        let page = if paginate {
            let page = PageRequest::new(request.page_number(), self.page_size(request));
            self.store().paginate(query, page).await?
        } else {
            Paginated::single(self.store().all(query).await?)
        };
        let page = page
            .with_path(request.path())
            .appends(request.all().clone());
        debug!(total = page.total(), current_page = page.current_page(), "Fetched page");

        match self.context().transformer() {
            Some(transformer) => {
                let mut collection = TransformedPage::collection(transformer, &page, request);
                if let Some(extra) = self.context().additional_for(&action, request) {
                    collection = collection.additional(extra);
                }
                Ok(ItemsPage::Transformed(collection))
            }
            None => Ok(ItemsPage::Raw(page.to_array()?)),
        }
    }

    /// Resolve an item request. `Ok(None)` when no record matches.
    ///
    /// Without relations to load, the record is looked up by id alone; filters and the base
    /// scope only apply on the relation-aware path.
    #[tracing::instrument(skip(self, id, request, params), fields(resource = model_name::<M>(), id = %id))]
    async fn get_item(
        &self,
        id: M::Id,
        request: &ApiRequest,
        params: &FilterParams,
        need_transform: bool,
    ) -> Result<Option<ItemResponse>, ItemsError> {
        let action = request.action()?;
        let relations = self.relations(&action, request);
        info!(%action, ?relations, "Resolving item");

        let query = if relations.is_empty() {
            Query::new()
        } else {
            self.base_query(request, params).with(relations)
        };

        let loaded = match self.store().find(id, query).await {
            Ok(loaded) => loaded,
            Err(e) if e.is_not_found() => {
                debug!("Not found");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let data = match self.context().transformer() {
            Some(transformer) if need_transform => transformer.transform(&loaded, request),
            _ => serde_json::to_value(&loaded)?,
        };

        let mut envelope = Map::new();
        envelope.insert("data".to_string(), data);
        if let Some(extra) = self.context().additional_for(&action, request) {
            envelope.extend(extra);
        }

        if action.is_mutation() {
            let data = envelope.remove("data").unwrap_or(Value::Null);
            return Ok(Some(ItemResponse::Bare(data)));
        }
        Ok(Some(ItemResponse::Envelope(envelope)))
    }
}

/// The stock [`ItemsService`]: a context plus the store it reads from.
pub struct ResourceService<M: Model> {
    context: ResourceContext<M>,
    store: StoreClient<M>,
}

impl<M: Model> ResourceService<M> {
    pub fn new(context: ResourceContext<M>, store: StoreClient<M>) -> Self {
        Self { context, store }
    }
}

impl<M: Model> ItemsService<M> for ResourceService<M> {
    fn context(&self) -> &ResourceContext<M> {
        &self.context
    }

    fn store(&self) -> &StoreClient<M> {
        &self.store
    }
}
