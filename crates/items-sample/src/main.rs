//! # Items Framework Sample
//!
//! A catalog demo built on the items resolver.
//!
//! ## Core Components
//!
//! - **[model]**: Plain records ([`User`](items_sample::model::User),
//!   [`Product`](items_sample::model::Product), [`Order`](items_sample::model::Order)) implementing
//!   the `Model` trait.
//! - **[services]**: one resolver per resource with its transformer, relations and filters.
//! - **[lifecycle]**: starts the stores, wires relations, routes requests and shuts down.
//!
//! ## Quick Start
//!
//! The application entry point is in [`main`], which demonstrates:
//! 1.  Starting the [`Catalog`] and seeding demo data.
//! 2.  Listing and filtering resources.
//! 3.  Showing a single record with its relations.
//! 4.  Archiving a product and listing again.

use items_framework::tracing::setup_tracing;
use items_sample::lifecycle::{Catalog, CatalogError};
use items_sample::model::ProductId;
use tracing::{error, info, Instrument};

fn print(label: &str, value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("== {label}\n{json}"),
        Err(e) => error!(error = %e, "Could not render response"),
    }
}

#[tokio::main]
async fn main() -> Result<(), CatalogError> {
    // Setup tracing once for the entire application
    setup_tracing();

    info!("Starting catalog");
    let catalog = Catalog::start()?;
    catalog.seed_demo().await?;

    let routes = [
        ("UserController@index", "/users"),
        ("ProductController@index", "/products?in_stock=1&sort=-price"),
        ("ProductController@show", "/products/1"),
        ("OrderController@index", "/orders?user_id=1&limit=5"),
        ("OrderController@show", "/orders/3"),
    ];

    let span = tracing::info_span!("requests");
    async {
        for (route, uri) in routes {
            match catalog.dispatch(route, uri).await {
                Ok(response) => print(&format!("{route} {uri}"), &response),
                Err(e) => error!(route, uri, error = %e, "Request failed"),
            }
        }
    }
    .instrument(span)
    .await;

    // Archived products drop out of every filtered listing
    let span = tracing::info_span!("archive");
    let listing = async {
        catalog.products.archive(ProductId(1)).await?;
        catalog.dispatch("ProductController@index", "/products").await
    }
    .instrument(span)
    .await?;
    print("ProductController@index /products (after archive)", &listing);

    match catalog.dispatch("ProductController@show", "/products/99").await {
        Ok(_) => error!("Missing product resolved"),
        Err(e) => info!(error = %e, "Missing product reported"),
    }

    // Shutdown gracefully
    catalog.shutdown().await;

    info!("Application completed successfully");
    Ok(())
}
