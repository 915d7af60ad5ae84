//! # Catalog Models
//!
//! Pure data structures ([`User`], [`Product`], [`Review`], [`Order`]) implementing the
//! [`Model`](items_framework::Model) trait, plus their creation/update payloads.
//!
//! Every model has a newtype id (`UserId`, `ProductId`, ...) so stores and relation loaders
//! cannot mix up keys. Ids serialize as plain numbers and display with their resource prefix
//! (`product_3`).

pub mod error;
pub mod order;
pub mod product;
pub mod review;
pub mod user;

pub use error::ModelError;
pub use order::{Order, OrderCreate, OrderId, OrderStatus};
pub use product::{Product, ProductCreate, ProductId, ProductUpdate};
pub use review::{Review, ReviewCreate, ReviewId};
pub use user::{User, UserCreate, UserId, UserUpdate};
