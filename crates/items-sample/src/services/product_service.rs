//! The products resource.
//!
//! Products are soft deleted, so the service scopes every filtered query to live rows. `index`
//! loads no relations by default and can ask for them through `?expand=`; every other
//! non-mutating action loads `reviews` and the `rating` summary.

use crate::model::{Product, ProductId, ProductUpdate};
use crate::transformers::product_resource;
use items_framework::{
    Action, ItemsService, Query, RelationSpec, ResourceContext, StoreClient, StoreError,
};
use serde_json::{json, Map};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

pub struct ProductService {
    context: ResourceContext<Product>,
    store: StoreClient<Product>,
}

impl ProductService {
    pub fn new(store: StoreClient<Product>) -> Self {
        let context = ResourceContext::<Product>::new()
            .with_transformer(product_resource)
            .with_relations(RelationSpec::per_action([
                ("index", vec![]),
                ("show", vec!["reviews", "rating"]),
            ]))
            .with_filter_scope()
            .with_additional(Action::Index, |request| {
                let mut extra = Map::new();
                extra.insert("currency".to_string(), json!("EUR"));
                extra.insert(
                    "filters".to_string(),
                    json!(request
                        .all()
                        .keys()
                        .filter(|key| !matches!(key.as_str(), "page" | "limit" | "expand"))
                        .collect::<Vec<_>>()),
                );
                extra
            });
        Self { context, store }
    }

    /// Soft delete: stamp `deleted_at` with the current time.
    ///
    /// Archiving twice keeps the first timestamp.
    pub async fn archive(&self, id: ProductId) -> Result<Product, StoreError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        let product = self
            .store
            .update(
                id,
                ProductUpdate {
                    deleted_at: Some(now),
                    ..ProductUpdate::default()
                },
            )
            .await?;
        info!(product_id = %product.id, "Product archived");
        Ok(product)
    }
}

impl ItemsService<Product> for ProductService {
    fn context(&self) -> &ResourceContext<Product> {
        &self.context
    }

    fn store(&self) -> &StoreClient<Product> {
        &self.store
    }

    fn base_query_filter(&self, query: Query<Product>) -> Query<Product> {
        query.where_null("deleted_at")
    }
}
