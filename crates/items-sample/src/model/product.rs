//! Catalog products.
//!
//! Products are soft deleted: archiving sets `deleted_at` and the products resource hides
//! archived rows from every filtered query.

use super::error::{check_price, require, ModelError};
use items_framework::query::SortOrder;
use items_framework::{ApiRequest, Condition, FilterParams, FilterScope, Model, Query};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Products.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductId(pub u32);

impl From<u32> for ProductId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "product_{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    /// Unix timestamp of archival, `None` while the product is live.
    pub deleted_at: Option<u64>,
}

/// DTOs for Product creation and updates.
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub price: Option<f64>,
    pub quantity: Option<u32>,
    pub deleted_at: Option<u64>,
}

impl Model for Product {
    type Id = ProductId;
    type Create = ProductCreate;
    type Update = ProductUpdate;
    type Error = ModelError;

    fn id(&self) -> &ProductId {
        &self.id
    }

    fn from_create_params(id: ProductId, params: ProductCreate) -> Result<Self, ModelError> {
        require("name", &params.name)?;
        check_price(params.price)?;
        Ok(Self {
            id,
            name: params.name,
            price: params.price,
            quantity: params.quantity,
            deleted_at: None,
        })
    }

    /// # Fields Updated
    /// - `price`: Product price
    /// - `quantity`: Available stock quantity
    /// - `deleted_at`: archive timestamp (an archived product stays archived)
    fn apply_update(&mut self, update: ProductUpdate) -> Result<(), ModelError> {
        if let Some(price) = update.price {
            check_price(price)?;
            self.price = price;
        }
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        if let Some(deleted_at) = update.deleted_at {
            self.deleted_at.get_or_insert(deleted_at);
        }
        Ok(())
    }
}

/// Caller-supplied value first, then the query string. Empty values count as absent.
fn param<'a>(request: &'a ApiRequest, params: &'a FilterParams, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(String::as_str)
        .or_else(|| request.get(key))
        .filter(|value| !value.is_empty())
}

impl FilterScope for Product {
    /// - `name`: case-insensitive substring match
    /// - `min_price` / `max_price`: inclusive price bounds
    /// - `in_stock=1`: quantity above zero
    /// - `sort`: `name`, `price` (prefix `-` for descending), default by name
    fn filter_and_relations_and_sort(request: &ApiRequest, params: &FilterParams) -> Query<Self> {
        let mut query = Query::new();
        if let Some(name) = param(request, params, "name") {
            query = query.filter(Condition::like("name", format!("%{name}%")));
        }
        if let Some(min) = param(request, params, "min_price") {
            query = query.filter(Condition::gte("price", min));
        }
        if let Some(max) = param(request, params, "max_price") {
            query = query.filter(Condition::lte("price", max));
        }
        if param(request, params, "in_stock") == Some("1") {
            query = query.filter(Condition::gt("quantity", 0));
        }
        if request.has("sort") {
            query.sort_from(request, &["name", "price"])
        } else {
            query.order_by("name", SortOrder::Asc)
        }
    }
}
