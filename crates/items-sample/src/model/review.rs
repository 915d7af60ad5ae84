use super::error::{require, ModelError};
use super::ProductId;
use items_framework::Model;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Reviews.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReviewId(pub u32);

impl From<u32> for ReviewId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for ReviewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "review_{}", self.0)
    }
}

/// A customer review, loaded as the `reviews` relation of a product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub rating: u8,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct ReviewCreate {
    pub product_id: ProductId,
    pub rating: u8,
    pub body: String,
}

fn check_rating(rating: u8) -> Result<(), ModelError> {
    if !(1..=5).contains(&rating) {
        return Err(ModelError::InvalidRating(rating));
    }
    Ok(())
}

impl Model for Review {
    type Id = ReviewId;
    type Create = ReviewCreate;
    /// Reviews can only be re-rated.
    type Update = u8;
    type Error = ModelError;

    fn id(&self) -> &ReviewId {
        &self.id
    }

    fn from_create_params(id: ReviewId, params: ReviewCreate) -> Result<Self, ModelError> {
        check_rating(params.rating)?;
        require("body", &params.body)?;
        Ok(Self {
            id,
            product_id: params.product_id,
            rating: params.rating,
            body: params.body,
        })
    }

    fn apply_update(&mut self, rating: u8) -> Result<(), ModelError> {
        check_rating(rating)?;
        self.rating = rating;
        Ok(())
    }
}
