//! Customer orders.
//!
//! An order belongs to a user and a product; the orders resource always eager loads both.

use super::error::ModelError;
use super::{ProductId, UserId};
use items_framework::{ApiRequest, FilterParams, FilterScope, Model, Query};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u32);

impl From<u32> for OrderId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Shipped,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub total: f64,
    pub status: OrderStatus,
}

/// Payload for creating a new order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub total: f64,
}

impl Model for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    type Update = OrderStatus;
    type Error = ModelError;

    fn id(&self) -> &OrderId {
        &self.id
    }

    /// New orders start as [`OrderStatus::Pending`].
    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, ModelError> {
        if params.quantity == 0 {
            return Err(ModelError::InvalidQuantity(0));
        }
        super::error::check_price(params.total)?;
        Ok(Self {
            id,
            user_id: params.user_id,
            product_id: params.product_id,
            quantity: params.quantity,
            total: params.total,
            status: OrderStatus::Pending,
        })
    }

    fn apply_update(&mut self, status: OrderStatus) -> Result<(), ModelError> {
        self.status = status;
        Ok(())
    }
}

impl FilterScope for Order {
    /// Equality filters on `user_id`, `product_id` and `status`; `sort` on `total` or `id`.
    fn filter_and_relations_and_sort(request: &ApiRequest, params: &FilterParams) -> Query<Self> {
        Query::new()
            .filter_from(request, params, &["user_id", "product_id", "status"])
            .sort_from(request, &["total", "id"])
    }
}
