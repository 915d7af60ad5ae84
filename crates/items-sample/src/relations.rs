//! Catalog-specific relation loaders.

use crate::model::{Product, Review};
use async_trait::async_trait;
use items_framework::{Query, RelationLoader, StoreClient, StoreError};
use serde_json::{json, Value};

/// The `rating` relation of a product: `{ average, count }` over its reviews.
///
/// `average` is `null` for a product without reviews.
pub struct RatingSummary {
    reviews: StoreClient<Review>,
}

impl RatingSummary {
    pub fn new(reviews: StoreClient<Review>) -> Self {
        Self { reviews }
    }
}

#[async_trait]
impl RelationLoader<Product> for RatingSummary {
    async fn load(&self, product: &Product) -> Result<Value, StoreError> {
        let reviews = self
            .reviews
            .all(Query::new().where_eq("product_id", product.id.0))
            .await?;
        let count = reviews.len();
        let average = (count > 0).then(|| {
            let sum: u32 = reviews.iter().map(|r| u32::from(r.record.rating)).sum();
            (f64::from(sum) / count as f64 * 10.0).round() / 10.0
        });
        Ok(json!({ "average": average, "count": count }))
    }
}
