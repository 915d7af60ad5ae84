use crate::model::{Order, OrderId, Product, ProductId, Review, User, UserId};
use crate::relations::RatingSummary;
use crate::services::{order_service, user_service, ProductService};
use items_framework::{
    Action, ApiRequest, BelongsTo, FilterParams, HasMany, ItemsError, ItemsService, Model,
    ModelStore, Relations, ResourceService, StoreClient, StoreError,
};
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

/// Capacity of every store's request channel.
const STORE_BUFFER: usize = 32;

/// Errors surfaced by [`Catalog::dispatch`].
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("No controller named `{0}`")]
    UnknownController(String),
    #[error("`{0}` is not a valid record id")]
    InvalidId(String),
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },
    #[error(transparent)]
    Items(#[from] ItemsError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Invalid resource configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// The running catalog: one store per model, one service per resource.
///
/// # Relation graph
///
/// ```text
/// orders ──user──► users
///        ──product──► products ──reviews / rating──► reviews
/// ```
///
/// The graph is acyclic, so dropping the services closes every store in turn.
pub struct Catalog {
    pub users: ResourceService<User>,
    pub products: ProductService,
    pub orders: ResourceService<Order>,
    pub reviews: StoreClient<Review>,
    handles: Vec<JoinHandle<()>>,
}

impl Catalog {
    /// Creates every store, wires relation loaders and starts the store tasks.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn start() -> Result<Self, CatalogError> {
        // 1. Create stores (no relations yet)
        let (user_store, users) = ModelStore::<User>::new(STORE_BUFFER);
        let (review_store, reviews) = ModelStore::<Review>::new(STORE_BUFFER);
        let (product_store, products) = ModelStore::<Product>::new(STORE_BUFFER);
        let (order_store, orders) = ModelStore::<Order>::new(STORE_BUFFER);

        // 2. Start stores with their relation loaders
        let user_handle = tokio::spawn(user_store.run(Relations::none()));
        let review_handle = tokio::spawn(review_store.run(Relations::none()));
        let product_handle = tokio::spawn(
            product_store.run(
                Relations::none()
                    .register(
                        "reviews",
                        HasMany::new(reviews.clone(), "product_id", |p: &Product| json!(p.id)),
                    )
                    .register("rating", RatingSummary::new(reviews.clone())),
            ),
        );
        let order_handle = tokio::spawn(
            order_store.run(
                Relations::none()
                    .register(
                        "user",
                        BelongsTo::new(users.clone(), |o: &Order| Some(o.user_id.clone())),
                    )
                    .register(
                        "product",
                        BelongsTo::new(products.clone(), |o: &Order| Some(o.product_id.clone())),
                    ),
            ),
        );

        info!("Catalog started");
        Ok(Self {
            users: user_service(users)?,
            products: ProductService::new(products),
            orders: order_service(orders),
            reviews,
            handles: vec![order_handle, product_handle, review_handle, user_handle],
        })
    }

    /// Serve `Controller@action` for `uri`, the way a router would.
    ///
    /// `index` resolves a page; every other action resolves the record whose id is the last
    /// path segment (`/products/3`).
    #[instrument(skip(self))]
    pub async fn dispatch(&self, route: &str, uri: &str) -> Result<Value, CatalogError> {
        let request = ApiRequest::from_uri(uri)?.with_route(route);
        let action = request.action()?;
        let controller = route.split('@').next().unwrap_or_default();
        let params = FilterParams::new();

        match controller {
            "UserController" => {
                resolve::<User, _>(&self.users, "user", &request, &params, &action, UserId).await
            }
            "ProductController" => {
                let products = &self.products;
                resolve::<Product, _>(products, "product", &request, &params, &action, ProductId)
                    .await
            }
            "OrderController" => {
                resolve::<Order, _>(&self.orders, "order", &request, &params, &action, OrderId)
                    .await
            }
            other => {
                warn!(controller = other, "Unknown controller");
                Err(CatalogError::UnknownController(other.to_string()))
            }
        }
    }

    /// Gracefully shuts down every store.
    ///
    /// Dropping the services closes the store channels; each store exits once its last client
    /// (including clients held by other stores' relation loaders) is gone.
    pub async fn shutdown(self) {
        info!("Shutting down catalog");
        let Self {
            users,
            products,
            orders,
            reviews,
            handles,
        } = self;
        drop(users);
        drop(products);
        drop(orders);
        drop(reviews);

        for handle in handles {
            let _ = handle.await;
        }
        info!("Catalog shut down");
    }
}

async fn resolve<M, S>(
    service: &S,
    resource: &'static str,
    request: &ApiRequest,
    params: &FilterParams,
    action: &Action,
    make_id: fn(u32) -> M::Id,
) -> Result<Value, CatalogError>
where
    M: Model,
    S: ItemsService<M>,
{
    if *action == Action::Index {
        let page = service.get_items(request, params, true).await?;
        return Ok(page.into_value().map_err(ItemsError::from)?);
    }

    let segment = request.path().rsplit('/').next().unwrap_or_default();
    let id = segment
        .parse::<u32>()
        .map_err(|_| CatalogError::InvalidId(segment.to_string()))?;

    match service.get_item(make_id(id), request, params, true).await? {
        Some(item) => Ok(item.into_value()),
        None => Err(CatalogError::NotFound {
            resource,
            id: segment.to_string(),
        }),
    }
}
