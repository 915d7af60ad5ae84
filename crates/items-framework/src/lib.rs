//! # Items Framework
//!
//! This crate provides generic "list" and "get" operations for REST resource controllers on
//! top of a small ORM-like query layer. A controller hands the resolver ([`ItemsService`]) the
//! incoming [`ApiRequest`]; the resolver builds a filtered, relation-eager-loaded query, runs it
//! against the model's store, paginates and shapes the response.
//!
//! ## Architecture Overview
//!
//! The framework separates concerns into three layers:
//!
//! 1. **Model Layer** ([`Model`], [`FilterScope`]) - your records and how request parameters
//!    become filters
//! 2. **Store Layer** ([`ModelStore`], [`StoreClient`]) - an actor owning the records of one
//!    model, answering [`Query`]s, paginating and eager loading [`Relations`]
//! 3. **Resolver Layer** ([`ItemsService`], [`ResourceContext`]) - per-resource configuration
//!    and the request-to-response pipeline
//!
//! The resolver is written **once** against the model trait; a resource only declares its
//! context (transformer, relations, page size, filter capability, additional-data hooks).
//!
//! ## Quick Start
//!
//! ```rust
//! use items_framework::{
//!     ApiRequest, FilterParams, ItemsPage, ItemsService, Model, ModelStore, Relations,
//!     ResourceContext, ResourceService,
//! };
//! use serde::Serialize;
//!
//! // 1. Define the Model
//! #[derive(Debug, Clone, Serialize)]
//! struct User {
//!     id: u32,
//!     name: String,
//! }
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("name must not be empty")]
//! struct UserError;
//!
//! impl Model for User {
//!     type Id = u32;
//!     type Create = String;
//!     type Update = String;
//!     type Error = UserError;
//!
//!     fn id(&self) -> &u32 { &self.id }
//!
//!     fn from_create_params(id: u32, name: String) -> Result<Self, UserError> {
//!         if name.is_empty() { return Err(UserError); }
//!         Ok(Self { id, name })
//!     }
//!
//!     fn apply_update(&mut self, name: String) -> Result<(), UserError> {
//!         self.name = name;
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     // 2. Start the store
//!     let (store, client) = ModelStore::<User>::new(10);
//!     tokio::spawn(store.run(Relations::none()));
//!     client.insert("Alice".into()).await.unwrap();
//!
//!     // 3. Resolve a list request
//!     let service = ResourceService::new(ResourceContext::new(), client);
//!     let request = ApiRequest::from_uri("/users?limit=5")
//!         .unwrap()
//!         .with_route("UserController@index");
//!
//!     let page = service.get_items(&request, &FilterParams::new(), true).await.unwrap();
//!     let ItemsPage::Raw(page) = page else { panic!("no transformer configured") };
//!     assert_eq!(page["total"], 1);
//!     assert_eq!(page["per_page"], 5);
//!     assert_eq!(page["data"][0]["name"], "Alice");
//! }
//! ```
//!
//! ## Relation Injection Pattern
//!
//! Relation loaders are injected at **runtime** through `run()`, not at construction time.
//! Every store is created first, then started with loaders holding the clients of the stores
//! it relates to:
//!
//! ```rust,ignore
//! let (user_store, users) = ModelStore::<User>::new(32);
//! let (order_store, orders) = ModelStore::<Order>::new(32);
//!
//! tokio::spawn(user_store.run(Relations::none()));
//! tokio::spawn(order_store.run(
//!     Relations::none().register("user", BelongsTo::new(users.clone(), |o: &Order| Some(o.user_id))),
//! ));
//! ```
//!
//! Keep the relation graph acyclic; see [`relation`].
//!
//! ## Concurrency Model
//!
//! - Each store runs in its own Tokio task and processes requests **sequentially**
//! - Stores for different models run in parallel
//! - Resolver calls are request-scoped; the only shared state is each store's record map
//!
//! ## Testing
//!
//! [`mock::MockStore`] hands out a real [`StoreClient`] answered from scripted expectations,
//! so resolver logic can be tested without seeding a store. See the [`mock`] module.

pub mod client;
pub mod error;
pub mod message;
pub mod mock;
pub mod model;
pub mod pagination;
pub mod query;
pub mod relation;
pub mod request;
pub mod resource;
pub mod service;
pub mod store;
pub mod tracing;
pub mod transform;

// Re-export core types for convenience
pub use client::StoreClient;
pub use error::{ItemsError, StoreError};
pub use message::{Response, StoreRequest};
pub use model::{FilterScope, Loaded, Model};
pub use pagination::{PageRequest, Paginated};
pub use query::{Condition, Query, SortOrder};
pub use relation::{BelongsTo, HasMany, RelationLoader, Relations};
pub use request::{Action, ApiRequest, FilterParams};
pub use resource::{RelationSpec, ResourceConfig, ResourceContext, DEFAULT_PAGE_SIZE};
pub use service::{ItemResponse, ItemsPage, ItemsService, ResourceService};
pub use store::ModelStore;
pub use transform::{TransformedPage, Transformer};
