use crate::model::User;
use items_framework::{ResourceConfig, ResourceContext, ResourceService, StoreClient};

/// Declarative configuration of the users resource.
pub const USER_RESOURCE: &str = r#"{ "relations": [], "default_page_size": 20 }"#;

/// The users resource: raw paginator pages, no filters.
///
/// # Errors
/// Fails when [`USER_RESOURCE`] does not parse as a [`ResourceConfig`].
pub fn user_service(store: StoreClient<User>) -> Result<ResourceService<User>, serde_json::Error> {
    let config: ResourceConfig = serde_json::from_str(USER_RESOURCE)?;
    Ok(ResourceService::new(ResourceContext::from_config(config), store))
}
