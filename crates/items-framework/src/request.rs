//! # Requests & Actions
//!
//! [`ApiRequest`] is the inbound request abstraction: a path, query parameters and the route
//! handler bound to it. [`Action`] is derived from that handler (`ProductController@index`
//! → [`Action::Index`]) and threaded explicitly through the resolver.

use crate::error::ItemsError;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Extra filter parameters supplied by the caller alongside the request.
pub type FilterParams = BTreeMap<String, String>;

/// The controller action serving a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    Index,
    Show,
    Store,
    Update,
    Destroy,
    Custom(String),
}

impl Action {
    /// Parse the action from a route handler name such as `OrderController@show`.
    pub fn from_route(handler: &str) -> Result<Self, ItemsError> {
        match handler.split_once('@') {
            Some((_, action)) if !action.is_empty() => Ok(Action::from(action)),
            _ => Err(ItemsError::InvalidRoute(handler.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Action::Index => "index",
            Action::Show => "show",
            Action::Store => "store",
            Action::Update => "update",
            Action::Destroy => "destroy",
            Action::Custom(name) => name,
        }
    }

    /// Update and destroy never eager load and return bare item payloads.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Action::Update | Action::Destroy)
    }
}

impl From<&str> for Action {
    fn from(name: &str) -> Self {
        match name {
            "index" => Action::Index,
            "show" => Action::Show,
            "store" => Action::Store,
            "update" => Action::Update,
            "destroy" => Action::Destroy,
            other => Action::Custom(other.to_string()),
        }
    }
}

impl FromStr for Action {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Action::from(s))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An incoming HTTP-like request.
///
/// # Example
///
/// ```rust
/// use items_framework::{Action, ApiRequest};
///
/// let request = ApiRequest::from_uri("/products?limit=5&expand=reviews")
///     .unwrap()
///     .with_route("ProductController@index");
///
/// assert_eq!(request.get("limit"), Some("5"));
/// assert_eq!(request.expand(), vec!["reviews".to_string()]);
/// assert_eq!(request.action().unwrap(), Action::Index);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiRequest {
    path: String,
    query: BTreeMap<String, String>,
    route: Option<String>,
}

impl ApiRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Parse `path?query` into a request without a route binding.
    pub fn from_uri(uri: &str) -> Result<Self, ItemsError> {
        let (path, query) = uri.split_once('?').unwrap_or((uri, ""));
        let pairs: Vec<(String, String)> =
            serde_urlencoded::from_str(query).map_err(|e| ItemsError::InvalidUri {
                uri: uri.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            path: path.to_string(),
            query: pairs.into_iter().collect(),
            route: None,
        })
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Bind the route handler (e.g. `ProductController@index`) serving this request.
    pub fn with_route(mut self, handler: impl Into<String>) -> Self {
        self.route = Some(handler.into());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    pub fn has(&self, key: &str) -> bool {
        self.query.contains_key(key)
    }

    pub fn all(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    /// The action of the bound route.
    pub fn action(&self) -> Result<Action, ItemsError> {
        let handler = self.route.as_deref().ok_or(ItemsError::MissingRoute)?;
        Action::from_route(handler)
    }

    /// Relation names from the comma-separated `expand` parameter, verbatim.
    pub fn expand(&self) -> Vec<String> {
        match self.get("expand") {
            Some(expand) if !expand.is_empty() => expand.split(',').map(str::to_string).collect(),
            _ => Vec::new(),
        }
    }

    /// The requested page; anything unparseable or below 1 means the first page.
    pub fn page_number(&self) -> usize {
        self.get("page")
            .and_then(|page| page.parse::<usize>().ok())
            .filter(|page| *page >= 1)
            .unwrap_or(1)
    }
}
