//! # Errors
//!
//! Two layers of errors live here:
//!
//! - [`StoreError`] is raised by the model store and its client (the query layer).
//! - [`ItemsError`] is raised by the resolver ([`ItemsService`](crate::ItemsService)).
//!
//! Store errors flow through the resolver untouched, except for
//! [`StoreError::NotFound`] on single-item lookups, which the resolver turns into `Ok(None)`.

/// Errors raised by a [`ModelStore`](crate::ModelStore) or its [`StoreClient`](crate::StoreClient).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store closed")]
    Closed,
    #[error("Store dropped response channel")]
    Dropped,
    #[error("No query results for model [{model}] {id}")]
    NotFound { model: &'static str, id: String },
    #[error("Call to undefined relationship [{relation}] on model [{model}]")]
    UnknownRelation {
        model: &'static str,
        relation: String,
    },
    #[error("No ids left for model [{0}]")]
    IdsExhausted(&'static str),
    #[error("Unknown column `{0}`")]
    UnknownColumn(String),
    #[error("Model error: {0}")]
    Model(Box<dyn std::error::Error + Send + Sync>),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// True for the find-or-fail miss, the only store error a lookup treats as "absent".
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Errors raised while resolving a list or item request.
#[derive(Debug, thiserror::Error)]
pub enum ItemsError {
    /// The request carries no route binding, so no action can be derived.
    #[error("No route is bound to the current request")]
    MissingRoute,
    #[error("Route handler `{0}` does not name an action")]
    InvalidRoute(String),
    #[error("Invalid request URI `{uri}`: {reason}")]
    InvalidUri { uri: String, reason: String },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
