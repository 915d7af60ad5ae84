//! # Pagination
//!
//! [`Paginated`] is a length-aware page: the items of one page plus enough bookkeeping
//! (total, per page, current page) to render navigation links. Its
//! [`to_array`](Paginated::to_array) form matches the classic Laravel paginator payload:
//!
//! ```text
//! { "current_page": 1, "data": [...], "first_page_url": "/products?page=1", "from": 1,
//!   "last_page": 3, "last_page_url": "/products?page=3",
//!   "next_page_url": "/products?page=2", "path": "/products", "per_page": 10,
//!   "prev_page_url": null, "to": 10, "total": 25 }
//! ```
//!
//! Links carry every appended request parameter, with `page` replaced by the target page.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

const PAGE_NAME: &str = "page";

/// Which slice of the result set a paginate call should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-indexed page number.
    pub page: usize,
    pub per_page: usize,
}

impl PageRequest {
    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page: page.max(1),
            per_page,
        }
    }

    /// Records to skip. Saturates, so a page past the end of any result set is empty.
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Paginated<T> {
    items: Vec<T>,
    total: usize,
    per_page: usize,
    current_page: usize,
    path: String,
    query: BTreeMap<String, String>,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: usize, per_page: usize, current_page: usize) -> Self {
        Self {
            items,
            total,
            per_page: per_page.max(1),
            current_page: current_page.max(1),
            path: "/".to_string(),
            query: BTreeMap::new(),
        }
    }

    /// Every item on a single page.
    pub fn single(items: Vec<T>) -> Self {
        let total = items.len();
        Self::new(items, total, total, 1)
    }

    /// Base path for generated links. Trailing slashes are trimmed except for the root.
    pub fn with_path(mut self, path: &str) -> Self {
        self.path = match path.trim_end_matches('/') {
            "" => "/".to_string(),
            trimmed => trimmed.to_string(),
        };
        self
    }

    /// Append query parameters to every generated link.
    pub fn appends(mut self, query: BTreeMap<String, String>) -> Self {
        self.query.extend(query);
        self
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn last_page(&self) -> usize {
        self.total.div_ceil(self.per_page).max(1)
    }

    /// 1-based position of the first item on this page, `None` when the page is empty.
    pub fn from(&self) -> Option<usize> {
        (!self.items.is_empty()).then(|| {
            (self.current_page - 1)
                .saturating_mul(self.per_page)
                .saturating_add(1)
        })
    }

    /// 1-based position of the last item on this page, `None` when the page is empty.
    pub fn to(&self) -> Option<usize> {
        self.from().map(|from| from + self.items.len() - 1)
    }

    pub fn has_more_pages(&self) -> bool {
        self.current_page < self.last_page()
    }

    /// Link to `page`, carrying the appended query parameters.
    pub fn url(&self, page: usize) -> String {
        let mut params = self.query.clone();
        params.insert(PAGE_NAME.to_string(), page.max(1).to_string());
        let query = serde_urlencoded::to_string(&params).unwrap_or_default();
        let separator = if self.path.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.path, separator, query)
    }

    pub fn next_page_url(&self) -> Option<String> {
        self.has_more_pages().then(|| self.url(self.current_page + 1))
    }

    pub fn previous_page_url(&self) -> Option<String> {
        (self.current_page > 1).then(|| self.url(self.current_page - 1))
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            per_page: self.per_page,
            current_page: self.current_page,
            path: self.path,
            query: self.query,
        }
    }
}

#[derive(Serialize)]
struct PageArray<'a, T> {
    current_page: usize,
    data: &'a [T],
    first_page_url: String,
    from: Option<usize>,
    last_page: usize,
    last_page_url: String,
    next_page_url: Option<String>,
    path: &'a str,
    per_page: usize,
    prev_page_url: Option<String>,
    to: Option<usize>,
    total: usize,
}

impl<T: Serialize> Paginated<T> {
    /// The plain array form of the page.
    pub fn to_array(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(PageArray {
            current_page: self.current_page,
            data: &self.items,
            first_page_url: self.url(1),
            from: self.from(),
            last_page: self.last_page(),
            last_page_url: self.url(self.last_page()),
            next_page_url: self.next_page_url(),
            path: &self.path,
            per_page: self.per_page,
            prev_page_url: self.previous_page_url(),
            to: self.to(),
            total: self.total,
        })
    }
}
