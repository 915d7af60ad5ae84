//! # Resource Context
//!
//! Static, per-resource configuration read by the resolver: the optional transformer, which
//! relations to eager load, the default page size, the optional filter capability and the
//! per-action additional-data hooks.
//!
//! A context is assembled once with builder calls and never changes afterwards:
//!
//! ```rust
//! use items_framework::{Action, RelationSpec, ResourceContext};
//! # use items_framework::Model;
//! # #[derive(Debug, Clone, serde::Serialize)] struct Order { id: u32 }
//! # #[derive(Debug, thiserror::Error)] #[error("invalid")] struct Invalid;
//! # impl Model for Order {
//! #     type Id = u32; type Create = (); type Update = (); type Error = Invalid;
//! #     fn id(&self) -> &u32 { &self.id }
//! #     fn from_create_params(id: u32, _: ()) -> Result<Self, Invalid> { Ok(Self { id }) }
//! #     fn apply_update(&mut self, _: ()) -> Result<(), Invalid> { Ok(()) }
//! # }
//!
//! let context = ResourceContext::<Order>::new()
//!     .with_relations(RelationSpec::flat(["user", "product"]))
//!     .with_default_page_size(20)
//!     .with_additional(Action::Show, |_request| {
//!         let mut extra = serde_json::Map::new();
//!         extra.insert("currency".into(), "EUR".into());
//!         extra
//!     });
//!
//! assert_eq!(context.default_page_size(), 20);
//! assert!(context.filter().is_none());
//! ```

use crate::model::{FilterScope, Model};
use crate::query::Query;
use crate::request::{Action, ApiRequest, FilterParams};
use crate::transform::Transformer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Page size used when neither the request nor the resource says otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Which relations a resource eager loads.
///
/// Deserializes from either a JSON array (flat) or an object keyed by action name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationSpec {
    /// The same relations for every action.
    Flat(Vec<String>),
    /// Relations per action name (`"index"`, `"show"`, ...).
    PerAction(BTreeMap<String, Vec<String>>),
}

impl RelationSpec {
    pub fn flat<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RelationSpec::Flat(names.into_iter().map(Into::into).collect())
    }

    pub fn per_action<I, A, N, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (A, N)>,
        A: Into<String>,
        N: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RelationSpec::PerAction(
            entries
                .into_iter()
                .map(|(action, names)| (action.into(), names.into_iter().map(Into::into).collect()))
                .collect(),
        )
    }

    /// Relations configured for `action`.
    ///
    /// A per-action spec without an entry for `action` falls back to every listed relation,
    /// in action-name order.
    pub fn for_action(&self, action: &Action) -> Vec<String> {
        match self {
            RelationSpec::Flat(names) => names.clone(),
            RelationSpec::PerAction(map) => match map.get(action.as_str()) {
                Some(names) => names.clone(),
                None => map.values().flatten().cloned().collect(),
            },
        }
    }
}

impl Default for RelationSpec {
    fn default() -> Self {
        RelationSpec::Flat(Vec::new())
    }
}

/// Extra top-level response keys for one action.
pub type AdditionalHook = Arc<dyn Fn(&ApiRequest) -> Map<String, Value> + Send + Sync>;

/// Builds the base query from request parameters.
pub type FilterFn<M> = fn(&ApiRequest, &FilterParams) -> Query<M>;

/// The serializable part of a resource context.
///
/// ```rust
/// use items_framework::{RelationSpec, ResourceConfig};
///
/// let config: ResourceConfig =
///     serde_json::from_str(r#"{ "relations": { "show": ["reviews"] } }"#).unwrap();
/// assert_eq!(config.default_page_size, 10);
/// assert!(matches!(config.relations, RelationSpec::PerAction(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfig {
    #[serde(default)]
    pub relations: RelationSpec,
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            relations: RelationSpec::default(),
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Static configuration of one resource.
pub struct ResourceContext<M: Model> {
    transformer: Option<Arc<dyn Transformer<M>>>,
    relations: RelationSpec,
    default_page_size: usize,
    filter: Option<FilterFn<M>>,
    additional: HashMap<Action, AdditionalHook>,
}

impl<M: Model> ResourceContext<M> {
    pub fn new() -> Self {
        Self {
            transformer: None,
            relations: RelationSpec::default(),
            default_page_size: DEFAULT_PAGE_SIZE,
            filter: None,
            additional: HashMap::new(),
        }
    }

    pub fn from_config(config: ResourceConfig) -> Self {
        Self::new()
            .with_relations(config.relations)
            .with_default_page_size(config.default_page_size)
    }

    pub fn with_transformer(mut self, transformer: impl Transformer<M> + 'static) -> Self {
        self.transformer = Some(Arc::new(transformer));
        self
    }

    pub fn with_relations(mut self, relations: RelationSpec) -> Self {
        self.relations = relations;
        self
    }

    pub fn with_default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = size;
        self
    }

    /// Register the additional-data hook for `action`, replacing any earlier one.
    pub fn with_additional<F>(mut self, action: Action, hook: F) -> Self
    where
        F: Fn(&ApiRequest) -> Map<String, Value> + Send + Sync + 'static,
    {
        self.additional.insert(action, Arc::new(hook));
        self
    }

    pub fn transformer(&self) -> Option<&dyn Transformer<M>> {
        self.transformer.as_deref()
    }

    pub fn relations(&self) -> &RelationSpec {
        &self.relations
    }

    pub fn default_page_size(&self) -> usize {
        self.default_page_size
    }

    pub fn filter(&self) -> Option<FilterFn<M>> {
        self.filter
    }

    /// Run the additional-data hook for `action`, if one is registered.
    pub fn additional_for(&self, action: &Action, request: &ApiRequest) -> Option<Map<String, Value>> {
        self.additional.get(action).map(|hook| hook(request))
    }
}

impl<M: FilterScope> ResourceContext<M> {
    /// Build base queries through the model's [`FilterScope`].
    pub fn with_filter_scope(mut self) -> Self {
        self.filter = Some(M::filter_and_relations_and_sort as FilterFn<M>);
        self
    }
}

impl<M: Model> Default for ResourceContext<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> fmt::Debug for ResourceContext<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut hooks: Vec<&str> = self.additional.keys().map(Action::as_str).collect();
        hooks.sort_unstable();
        f.debug_struct("ResourceContext")
            .field("transformer", &self.transformer.is_some())
            .field("relations", &self.relations)
            .field("default_page_size", &self.default_page_size)
            .field("filter", &self.filter.is_some())
            .field("additional", &hooks)
            .finish()
    }
}
