//! # Transformers
//!
//! A [`Transformer`] turns a loaded record into its public JSON representation. Resources
//! that configure one get [`TransformedPage`] collections for list actions and transformed
//! `data` payloads for item actions; resources without one expose the raw serialized record.
//!
//! Any `Fn(&Loaded<M>, &ApiRequest) -> Value` closure is a transformer.

use crate::model::{Loaded, Model};
use crate::pagination::Paginated;
use crate::request::ApiRequest;
use serde::Serialize;
use serde_json::{Map, Value};

/// Turns a record into its public representation.
pub trait Transformer<M: Model>: Send + Sync {
    fn transform(&self, record: &Loaded<M>, request: &ApiRequest) -> Value;
}

impl<M, F> Transformer<M> for F
where
    M: Model,
    F: Fn(&Loaded<M>, &ApiRequest) -> Value + Send + Sync,
{
    fn transform(&self, record: &Loaded<M>, request: &ApiRequest) -> Value {
        self(record, request)
    }
}

/// Navigation links of a transformed page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageLinks {
    pub first: String,
    pub last: String,
    pub prev: Option<String>,
    pub next: Option<String>,
}

/// Pagination metadata of a transformed page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageMeta {
    pub current_page: usize,
    pub from: Option<usize>,
    pub last_page: usize,
    pub path: String,
    pub per_page: usize,
    pub to: Option<usize>,
    pub total: usize,
}

/// A page of transformed records: `{ data, links, meta, ...additional }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformedPage {
    pub data: Vec<Value>,
    pub links: PageLinks,
    pub meta: PageMeta,
    #[serde(flatten)]
    pub additional: Map<String, Value>,
}

impl TransformedPage {
    /// Transform every record on `page`, keeping its pagination state.
    pub fn collection<M: Model>(
        transformer: &dyn Transformer<M>,
        page: &Paginated<Loaded<M>>,
        request: &ApiRequest,
    ) -> Self {
        Self {
            data: page
                .items()
                .iter()
                .map(|record| transformer.transform(record, request))
                .collect(),
            links: PageLinks {
                first: page.url(1),
                last: page.url(page.last_page()),
                prev: page.previous_page_url(),
                next: page.next_page_url(),
            },
            meta: PageMeta {
                current_page: page.current_page(),
                from: page.from(),
                last_page: page.last_page(),
                path: page.path().to_string(),
                per_page: page.per_page(),
                to: page.to(),
                total: page.total(),
            },
            additional: Map::new(),
        }
    }

    /// Merge extra top-level keys into the response.
    pub fn additional(mut self, extra: Map<String, Value>) -> Self {
        self.additional.extend(extra);
        self
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
