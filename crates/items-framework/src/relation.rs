//! # Relations
//!
//! Eager loading is driven by relation names. A store resolves each requested name through
//! the [`Relations`] registry it was started with; the registry maps names to
//! [`RelationLoader`]s, which usually hold a [`StoreClient`] for the related model.
//!
//! Loaders are injected when the store starts (`store.run(relations)`), not when it is
//! constructed, so stores can be created first and wired afterwards. Keep the relation graph
//! acyclic: a store whose loaders hold clients of each other never sees its channel close.

use crate::client::StoreClient;
use crate::error::StoreError;
use crate::model::Model;
use crate::query::Query;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Loads one named relation for a parent record.
#[async_trait]
pub trait RelationLoader<M: Model>: Send + Sync {
    async fn load(&self, parent: &M) -> Result<Value, StoreError>;
}

/// Registry of relation loaders for one model.
pub struct Relations<M: Model> {
    loaders: HashMap<String, Arc<dyn RelationLoader<M>>>,
}

impl<M: Model> Relations<M> {
    /// A model with no relations.
    pub fn none() -> Self {
        Self {
            loaders: HashMap::new(),
        }
    }

    pub fn register(mut self, name: impl Into<String>, loader: impl RelationLoader<M> + 'static) -> Self {
        self.loaders.insert(name.into(), Arc::new(loader));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn RelationLoader<M>>> {
        self.loaders.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.loaders.keys().map(String::as_str)
    }
}

impl<M: Model> Default for Relations<M> {
    fn default() -> Self {
        Self::none()
    }
}

/// Inverse one-to-one/one-to-many: the parent holds the related record's key.
///
/// Loads `null` when the parent has no key or the related record does not exist.
pub struct BelongsTo<M: Model, R: Model> {
    client: StoreClient<R>,
    foreign_key: fn(&M) -> Option<R::Id>,
}

impl<M: Model, R: Model> BelongsTo<M, R> {
    pub fn new(client: StoreClient<R>, foreign_key: fn(&M) -> Option<R::Id>) -> Self {
        Self {
            client,
            foreign_key,
        }
    }
}

#[async_trait]
impl<M: Model, R: Model> RelationLoader<M> for BelongsTo<M, R> {
    async fn load(&self, parent: &M) -> Result<Value, StoreError> {
        let Some(id) = (self.foreign_key)(parent) else {
            return Ok(Value::Null);
        };
        match self.client.find(id, Query::new()).await {
            Ok(related) => Ok(serde_json::to_value(&related)?),
            Err(e) if e.is_not_found() => Ok(Value::Null),
            Err(e) => Err(e),
        }
    }
}

/// One-to-many: related records whose `foreign_key` column equals the parent's key.
pub struct HasMany<M: Model, R: Model> {
    client: StoreClient<R>,
    foreign_key: String,
    local_key: fn(&M) -> Value,
}

impl<M: Model, R: Model> HasMany<M, R> {
    pub fn new(client: StoreClient<R>, foreign_key: impl Into<String>, local_key: fn(&M) -> Value) -> Self {
        Self {
            client,
            foreign_key: foreign_key.into(),
            local_key,
        }
    }
}

#[async_trait]
impl<M: Model, R: Model> RelationLoader<M> for HasMany<M, R> {
    async fn load(&self, parent: &M) -> Result<Value, StoreError> {
        let query = Query::new().where_eq(self.foreign_key.clone(), (self.local_key)(parent));
        let related = self.client.all(query).await?;
        Ok(serde_json::to_value(&related)?)
    }
}
