use items_framework::{ItemsError, StoreError};
use items_sample::lifecycle::{Catalog, CatalogError};
use items_sample::model::ProductId;
use serde_json::json;

async fn seeded() -> Catalog {
    let catalog = Catalog::start().expect("Failed to start catalog");
    catalog.seed_demo().await.expect("Failed to seed catalog");
    catalog
}

fn ids(page: &serde_json::Value) -> Vec<u64> {
    page["data"]
        .as_array()
        .expect("page without data")
        .iter()
        .map(|item| item["id"].as_u64().expect("item without id"))
        .collect()
}

/// Users have no transformer: list requests return the plain paginator array.
#[tokio::test]
async fn test_users_are_served_as_raw_pages() {
    let catalog = seeded().await;

    let page = catalog.dispatch("UserController@index", "/users").await.unwrap();
    assert_eq!(page["per_page"], 20);
    assert_eq!(page["total"], 2);
    assert_eq!(page["data"][0]["name"], "Alice");
    assert_eq!(page["data"][1]["email"], "bob@example.com");
    assert_eq!(page["next_page_url"], serde_json::Value::Null);

    let page = catalog
        .dispatch("UserController@index", "/users?limit=1")
        .await
        .unwrap();
    assert_eq!(page["last_page"], 2);
    assert_eq!(page["next_page_url"], "/users?limit=1&page=2");

    let user = catalog.dispatch("UserController@show", "/users/2").await.unwrap();
    assert_eq!(
        user,
        json!({ "data": { "id": 2, "name": "Bob", "email": "bob@example.com" } })
    );

    catalog.shutdown().await;
}

#[tokio::test]
async fn test_product_listing_hides_archived_products() {
    let catalog = seeded().await;

    let page = catalog
        .dispatch("ProductController@index", "/products")
        .await
        .unwrap();
    // Sorted by name, Cable is archived
    assert_eq!(ids(&page), vec![1, 3, 2]);
    assert_eq!(page["meta"]["total"], 3);
    assert_eq!(page["currency"], "EUR");
    assert_eq!(page["filters"], json!([]));
    assert_eq!(page["data"][0]["price"], "49.90");
    assert_eq!(page["data"][2]["in_stock"], false);

    catalog.products.archive(ProductId(2)).await.unwrap();
    let page = catalog
        .dispatch("ProductController@index", "/products?sort=-price")
        .await
        .unwrap();
    assert_eq!(ids(&page), vec![3, 1]);
    assert_eq!(page["filters"], json!(["sort"]));

    catalog.shutdown().await;
}

#[tokio::test]
async fn test_product_filters_and_expand() {
    let catalog = seeded().await;

    let page = catalog
        .dispatch("ProductController@index", "/products?in_stock=1&max_price=100")
        .await
        .unwrap();
    assert_eq!(ids(&page), vec![1]);

    let page = catalog
        .dispatch("ProductController@index", "/products?name=MON&expand=rating")
        .await
        .unwrap();
    assert_eq!(ids(&page), vec![3]);
    assert_eq!(page["data"][0]["rating"], json!({ "average": 3.0, "count": 1 }));
    assert!(page["data"][0].get("reviews").is_none());
    assert_eq!(page["filters"], json!(["name"]));

    catalog.shutdown().await;
}

#[tokio::test]
async fn test_product_show_loads_reviews_and_rating() {
    let catalog = seeded().await;

    let product = catalog
        .dispatch("ProductController@show", "/products/1")
        .await
        .unwrap();
    let data = &product["data"];
    assert_eq!(data["name"], "Keyboard");
    assert_eq!(data["rating"], json!({ "average": 4.5, "count": 2 }));
    assert_eq!(
        data["reviews"],
        json!([
            { "id": 1, "product_id": 1, "rating": 5, "body": "Great feel" },
            { "id": 2, "product_id": 1, "rating": 4, "body": "Loud but nice" },
        ])
    );
    // Show carries no index-only additional data
    assert!(product.get("currency").is_none());

    // Actions without their own entry load every configured relation
    let created = catalog
        .dispatch("ProductController@store", "/products/3")
        .await
        .unwrap();
    assert_eq!(created["data"]["rating"], json!({ "average": 3.0, "count": 1 }));
    assert_eq!(created["data"]["reviews"].as_array().unwrap().len(), 1);

    // The soft-delete scope applies whenever relations are loaded
    let archived = catalog
        .dispatch("ProductController@show", "/products/4")
        .await;
    assert!(matches!(
        archived,
        Err(CatalogError::NotFound { resource: "product", ref id }) if id == "4"
    ));

    catalog.shutdown().await;
}

/// Mutations look the record up by id alone and return the bare payload.
#[tokio::test]
async fn test_mutation_routes_return_bare_data() {
    let catalog = seeded().await;

    let product = catalog
        .dispatch("ProductController@update", "/products/4")
        .await
        .unwrap();
    assert_eq!(product["name"], "Cable");
    assert_eq!(product["archived"], true);
    assert!(product.get("reviews").is_none());

    let order = catalog
        .dispatch("OrderController@destroy", "/orders/2")
        .await
        .unwrap();
    assert_eq!(order["status"], "pending");
    // Relations are not loaded for mutations
    assert_eq!(order["customer"], serde_json::Value::Null);

    catalog.shutdown().await;
}

#[tokio::test]
async fn test_orders_are_filtered_transformed_and_linked() {
    let catalog = seeded().await;

    let page = catalog
        .dispatch("OrderController@index", "/orders?status=paid")
        .await
        .unwrap();
    assert_eq!(page["meta"]["total"], 1);
    assert_eq!(
        page["data"][0],
        json!({
            "id": 1,
            "status": "paid",
            "quantity": 1,
            "total": "49.90",
            "customer": { "id": 1, "name": "Alice" },
            "product": { "id": 1, "name": "Keyboard" },
        })
    );
    assert_eq!(page["links"]["first"], "/orders?page=1&status=paid");

    let page = catalog
        .dispatch("OrderController@index", "/orders?user_id=2&sort=-total")
        .await
        .unwrap();
    assert_eq!(ids(&page), vec![3, 4]);
    // Archived products still resolve through the relation
    assert_eq!(page["data"][1]["product"]["name"], "Cable");

    let page = catalog
        .dispatch("OrderController@index", "/orders?limit=2&page=2")
        .await
        .unwrap();
    assert_eq!(ids(&page), vec![3, 4]);
    assert_eq!(page["meta"]["per_page"], 2);
    assert_eq!(page["links"]["prev"], "/orders?limit=2&page=1");
    assert_eq!(page["links"]["next"], serde_json::Value::Null);

    let order = catalog.dispatch("OrderController@show", "/orders/3").await.unwrap();
    assert_eq!(order["data"]["customer"]["name"], "Bob");
    assert_eq!(order["links"], json!({ "self": "/orders/3" }));

    catalog.shutdown().await;
}

#[tokio::test]
async fn test_dispatch_errors() {
    let catalog = seeded().await;

    let result = catalog.dispatch("CartController@index", "/carts").await;
    assert!(matches!(result, Err(CatalogError::UnknownController(ref c)) if c == "CartController"));

    let result = catalog.dispatch("ProductController@show", "/products/abc").await;
    assert!(matches!(result, Err(CatalogError::InvalidId(ref id)) if id == "abc"));

    let result = catalog.dispatch("OrderController@show", "/orders/99").await;
    assert!(matches!(result, Err(CatalogError::NotFound { resource: "order", .. })));

    let result = catalog.dispatch("ProductController", "/products").await;
    assert!(matches!(
        result,
        Err(CatalogError::Items(ItemsError::InvalidRoute(_)))
    ));

    let result = catalog
        .dispatch("ProductController@index", "/products?expand=bogus")
        .await;
    assert!(matches!(
        result,
        Err(CatalogError::Items(ItemsError::Store(StoreError::UnknownRelation { .. })))
    ));

    catalog.shutdown().await;
}

/// Dropping the catalog's services lets every store task finish.
#[tokio::test]
async fn test_graceful_shutdown() {
    let catalog = seeded().await;

    tokio::time::timeout(std::time::Duration::from_secs(5), catalog.shutdown())
        .await
        .expect("Shutdown timed out");
}
