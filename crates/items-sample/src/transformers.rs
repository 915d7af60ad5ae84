//! # Transformers
//!
//! Public representations of catalog records. Each function is a
//! [`Transformer`](items_framework::Transformer): it receives the loaded record (with any eager
//! loaded relations) and the request being served.

use crate::model::{Order, Product};
use items_framework::{ApiRequest, Loaded};
use serde_json::{json, Map, Value};

/// `{ id, name, price, in_stock, archived }`, plus `reviews` / `rating` when loaded.
pub fn product_resource(product: &Loaded<Product>, _request: &ApiRequest) -> Value {
    let record = &product.record;
    let mut value = json!({
        "id": record.id,
        "name": record.name,
        "price": format!("{:.2}", record.price),
        "in_stock": record.quantity > 0,
        "archived": record.deleted_at.is_some(),
    });
    for relation in ["reviews", "rating"] {
        if let Some(loaded) = product.relation(relation) {
            value[relation] = loaded.clone();
        }
    }
    value
}

/// `{ id, status, quantity, total, customer, product }`.
///
/// `customer` and `product` are summaries of the eager loaded relations, `null` when a
/// relation was not loaded or points at a missing record.
pub fn order_resource(order: &Loaded<Order>, _request: &ApiRequest) -> Value {
    let record = &order.record;
    json!({
        "id": record.id,
        "status": record.status,
        "quantity": record.quantity,
        "total": format!("{:.2}", record.total),
        "customer": summary(order.relation("user"), "name"),
        "product": summary(order.relation("product"), "name"),
    })
}

fn summary(related: Option<&Value>, label: &str) -> Value {
    match related {
        Some(Value::Object(fields)) => {
            let mut summary = Map::new();
            for key in ["id", label] {
                summary.insert(key.to_string(), fields.get(key).cloned().unwrap_or(Value::Null));
            }
            Value::Object(summary)
        }
        _ => Value::Null,
    }
}
