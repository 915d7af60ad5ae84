//! Demo data for the binary, doc examples and integration tests.

use super::Catalog;
use crate::model::{
    OrderCreate, OrderStatus, ProductCreate, ProductId, ProductUpdate, ReviewCreate, UserCreate,
    UserId,
};
use items_framework::{ItemsService, StoreError};
use tracing::info;

/// Archive timestamp given to discontinued demo products.
pub const DEMO_ARCHIVED_AT: u64 = 1_700_000_000;

impl Catalog {
    /// Seed two users, four products (one archived), three reviews and four orders.
    ///
    /// | Order | User | Product | Status |
    /// |-------|------|---------|--------|
    /// | 1 | Alice | Keyboard | paid |
    /// | 2 | Alice | Monitor | pending |
    /// | 3 | Bob | Mouse | shipped |
    /// | 4 | Bob | Cable (archived) | cancelled |
    pub async fn seed_demo(&self) -> Result<(), StoreError> {
        let users = self.users.store();
        for (name, email) in [("Alice", "alice@example.com"), ("Bob", "bob@example.com")] {
            users
                .insert(UserCreate {
                    name: name.to_string(),
                    email: email.to_string(),
                })
                .await?;
        }

        let products = self.products.store();
        let catalog = [
            ("Keyboard", 49.9, 10),
            ("Mouse", 19.5, 0),
            ("Monitor", 189.0, 4),
            ("Cable", 5.0, 100),
        ];
        for (name, price, quantity) in catalog {
            products
                .insert(ProductCreate {
                    name: name.to_string(),
                    price,
                    quantity,
                })
                .await?;
        }
        products
            .update(
                ProductId(4),
                ProductUpdate {
                    deleted_at: Some(DEMO_ARCHIVED_AT),
                    ..ProductUpdate::default()
                },
            )
            .await?;

        let reviews = [
            (1, 5, "Great feel"),
            (1, 4, "Loud but nice"),
            (3, 3, "Okay colours"),
        ];
        for (product, rating, body) in reviews {
            self.reviews
                .insert(ReviewCreate {
                    product_id: ProductId(product),
                    rating,
                    body: body.to_string(),
                })
                .await?;
        }

        let orders = self.orders.store();
        let placed = [
            (1, 1, 1, 49.9, OrderStatus::Paid),
            (1, 3, 1, 189.0, OrderStatus::Pending),
            (2, 2, 2, 39.0, OrderStatus::Shipped),
            (2, 4, 3, 15.0, OrderStatus::Cancelled),
        ];
        for (user, product, quantity, total, status) in placed {
            let id = orders
                .insert(OrderCreate {
                    user_id: UserId(user),
                    product_id: ProductId(product),
                    quantity,
                    total,
                })
                .await?;
            if status != OrderStatus::Pending {
                orders.update(id, status).await?;
            }
        }

        info!("Demo data seeded");
        Ok(())
    }
}
