//! # Items Sample Library
//!
//! A small catalog (users, products, reviews, orders) served through `items-framework`.
//! The modules are exposed for integration testing and the doc examples.

pub mod lifecycle;
pub mod model;
pub mod relations;
pub mod services;
pub mod transformers;
