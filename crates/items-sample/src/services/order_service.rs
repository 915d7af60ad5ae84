use crate::model::Order;
use crate::transformers::order_resource;
use items_framework::{Action, RelationSpec, ResourceContext, ResourceService, StoreClient};
use serde_json::{json, Map};

/// The orders resource.
///
/// Always loads the `user` and `product` relations, filters through the order
/// [`FilterScope`](items_framework::FilterScope) and adds a `links.self` entry to `show`
/// responses.
pub fn order_service(store: StoreClient<Order>) -> ResourceService<Order> {
    let context = ResourceContext::<Order>::new()
        .with_transformer(order_resource)
        .with_relations(RelationSpec::flat(["user", "product"]))
        .with_filter_scope()
        .with_additional(Action::Show, |request| {
            let mut extra = Map::new();
            extra.insert("links".to_string(), json!({ "self": request.path() }));
            extra
        });
    ResourceService::new(context, store)
}
