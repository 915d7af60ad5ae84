//! # Model Trait
//!
//! The `Model` trait defines the contract every record type (User, Product, Order, …) must
//! implement to be stored in a [`ModelStore`](crate::ModelStore) and served by an
//! [`ItemsService`](crate::ItemsService).
//!
//! # Architecture Note
//! The store and the resolver are written *once* against this trait. Associated types keep
//! each resource honest: a `Product` store only accepts `ProductCreate` payloads and only
//! answers lookups by `ProductId`.
//!
//! Records are queried through their serialized attributes (`serde_json`), so filtering,
//! sorting and eager loading work for any `Serialize` model without per-model query code.
//!
//! # Filter capability
//! A model that knows how to translate request parameters into a query implements
//! [`FilterScope`]. The capability is opt-in: a resource only uses it once its context was
//! built with [`ResourceContext::with_filter_scope`](crate::ResourceContext::with_filter_scope),
//! which the compiler only allows for models implementing the trait.

use crate::query::Query;
use crate::request::{ApiRequest, FilterParams};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any record type must implement to be managed by a `ModelStore`.
pub trait Model: Clone + Debug + Serialize + Send + Sync + 'static {
    /// Primary key. Must be convertible from `u32` for automatic id generation and
    /// ordered so pages come back in a stable order.
    type Id: Eq + Ord + Hash + Clone + Send + Sync + Display + Debug + Serialize + From<u32>;

    /// The data required to create a new record.
    type Create: Send + Sync + Debug;

    /// The data required to update an existing record.
    type Update: Send + Sync + Debug;

    /// The error type for validation failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Page size used when a paginate call asks for zero items per page.
    const PER_PAGE: usize = 15;

    /// The primary key of this record.
    fn id(&self) -> &Self::Id;

    /// Build the record from a freshly allocated id and the creation payload.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Apply an update payload in place.
    fn apply_update(&mut self, update: Self::Update) -> Result<(), Self::Error>;

    /// Serialized attributes used for filtering and sorting.
    fn attributes(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                Ok(map)
            }
        }
    }
}

/// Opt-in capability: translate request parameters into filters, relations and sort clauses.
pub trait FilterScope: Model {
    fn filter_and_relations_and_sort(request: &ApiRequest, params: &FilterParams) -> Query<Self>;
}

/// A record together with its eager-loaded relations.
///
/// Serializes as the record's own attributes with one extra key per loaded relation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Loaded<M> {
    #[serde(flatten)]
    pub record: M,
    #[serde(flatten)]
    pub relations: BTreeMap<String, Value>,
}

impl<M> Loaded<M> {
    pub fn new(record: M) -> Self {
        Self {
            record,
            relations: BTreeMap::new(),
        }
    }

    pub fn with_relation(mut self, name: impl Into<String>, value: Value) -> Self {
        self.relations.insert(name.into(), value);
        self
    }

    /// The loaded relation, if it was requested.
    pub fn relation(&self, name: &str) -> Option<&Value> {
        self.relations.get(name)
    }
}

/// Short type name used in logs and error messages (e.g. "Product").
pub(crate) fn model_name<M>() -> &'static str {
    std::any::type_name::<M>()
        .split("::")
        .last()
        .unwrap_or("Unknown")
}
