//! # Resource Services
//!
//! One [`ItemsService`](items_framework::ItemsService) per catalog resource:
//!
//! | Resource | Service | Transformer | Relations | Filter |
//! |----------|---------|-------------|-----------|--------|
//! | users | [`ResourceService<User>`](items_framework::ResourceService) | none | none | none |
//! | products | [`ProductService`] | `product_resource` | `index`: none, other actions: reviews, rating | `FilterScope` + soft delete |
//! | orders | [`ResourceService<Order>`](items_framework::ResourceService) | `order_resource` | user, product | `FilterScope` |

pub mod order_service;
pub mod product_service;
pub mod user_service;

pub use order_service::order_service;
pub use product_service::ProductService;
pub use user_service::user_service;
