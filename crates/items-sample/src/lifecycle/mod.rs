//! # Catalog Lifecycle & Orchestration
//!
//! This module manages the runtime lifecycle of the catalog: starting one store per model,
//! wiring relation loaders between them, exposing one service per resource and shutting
//! everything down again.
//!
//! ## The Catalog Pattern
//!
//! ```rust,ignore
//! // 1. Create stores (no relations yet - avoids circular refs)
//! let (user_store, users) = ModelStore::<User>::new(32);
//! let (order_store, orders) = ModelStore::<Order>::new(32);
//!
//! // 2. Start stores with their relation loaders injected
//! tokio::spawn(user_store.run(Relations::none()));
//! tokio::spawn(order_store.run(
//!     Relations::none().register("user", BelongsTo::new(users.clone(), |o: &Order| Some(o.user_id.clone()))),
//! ));
//!
//! // 3. Hand the clients to the services
//! let orders = order_service(orders);
//! ```
//!
//! ## Routing
//!
//! [`Catalog::dispatch`] plays the router: it binds `Controller@action` to the request,
//! resolves `index` through `get_items` and every other action through `get_item`, taking the
//! id from the last path segment.
//!
//! ```rust
//! use items_sample::lifecycle::Catalog;
//!
//! #[tokio::main]
//! async fn main() {
//!     let catalog = Catalog::start().unwrap();
//!     catalog.seed_demo().await.unwrap();
//!
//!     let page = catalog
//!         .dispatch("OrderController@index", "/orders?status=paid")
//!         .await
//!         .unwrap();
//!     assert_eq!(page["meta"]["total"], 1);
//!
//!     catalog.shutdown().await;
//! }
//! ```
//!
//! ## Graceful Shutdown
//!
//! 1. **Drop all services and clients** - closes the sender side of every channel
//! 2. **Stores detect closure** - `receiver.recv()` returns `None`
//! 3. **Stores exit** - dropping their relation loaders, which releases downstream stores
//! 4. **Await completion** - wait for all store tasks to finish
//!
//! This relies on the relation graph being **acyclic**.
//!
//! ## Observability
//!
//! Call [`setup_tracing`](items_framework::tracing::setup_tracing) once at startup:
//!
//! ```bash
//! RUST_LOG=info cargo run      # lookups and mutations
//! RUST_LOG=debug cargo run     # every store request with its query
//! ```

pub mod catalog;
pub mod seed;

pub use catalog::*;
