//! # Query Builder
//!
//! A [`Query`] is the description of what a store lookup should return: filter conditions,
//! relations to eager load and sort clauses. Queries are plain values; the
//! [`ModelStore`](crate::ModelStore) executes them against its records.
//!
//! Conditions compare against the model's serialized attributes with SQL-like loose
//! semantics: `"5"` equals `5`, `NULL` never compares equal or ordered, and `LIKE` is
//! case-insensitive with `%` and `_` wildcards.
//!
//! # Example
//!
//! ```rust
//! use items_framework::query::{Condition, SortOrder};
//! # use items_framework::{Model, Query};
//! # #[derive(Debug, Clone, serde::Serialize)]
//! # struct Product { id: u32 }
//! # #[derive(Debug, thiserror::Error)] #[error("invalid")] struct Invalid;
//! # impl Model for Product {
//! #     type Id = u32; type Create = (); type Update = (); type Error = Invalid;
//! #     fn id(&self) -> &u32 { &self.id }
//! #     fn from_create_params(id: u32, _: ()) -> Result<Self, Invalid> { Ok(Self { id }) }
//! #     fn apply_update(&mut self, _: ()) -> Result<(), Invalid> { Ok(()) }
//! # }
//!
//! let query = Query::<Product>::new()
//!     .filter(Condition::like("name", "%widget%"))
//!     .where_null("deleted_at")
//!     .with(["reviews"])
//!     .order_by("price", SortOrder::Desc);
//!
//! assert_eq!(query.conditions().len(), 2);
//! assert_eq!(query.relations(), ["reviews".to_string()]);
//! ```

use crate::error::StoreError;
use crate::model::Model;
use crate::request::{ApiRequest, FilterParams};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

/// Comparison operators for filter conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Like,
    In,
    IsNull,
    IsNotNull,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => write!(f, "="),
            Self::NotEqual => write!(f, "!="),
            Self::GreaterThan => write!(f, ">"),
            Self::GreaterThanOrEqual => write!(f, ">="),
            Self::LessThan => write!(f, "<"),
            Self::LessThanOrEqual => write!(f, "<="),
            Self::Like => write!(f, "LIKE"),
            Self::In => write!(f, "IN"),
            Self::IsNull => write!(f, "IS NULL"),
            Self::IsNotNull => write!(f, "IS NOT NULL"),
        }
    }
}

/// A single `field <operator> value` condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::Equal, value)
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::NotEqual, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::GreaterThan, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::GreaterThanOrEqual, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::LessThan, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::LessThanOrEqual, value)
    }

    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(field, Operator::Like, Value::String(pattern.into()))
    }

    pub fn in_list(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(field, Operator::In, Value::Array(values))
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Self::new(field, Operator::IsNull, Value::Null)
    }

    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::new(field, Operator::IsNotNull, Value::Null)
    }

    /// Evaluate against a record's attributes.
    ///
    /// # Errors
    /// [`StoreError::UnknownColumn`] when the record has no such attribute.
    pub fn matches(&self, attributes: &Map<String, Value>) -> Result<bool, StoreError> {
        let actual = attributes
            .get(&self.field)
            .ok_or_else(|| StoreError::UnknownColumn(self.field.clone()))?;
        let ordering = || compare(actual, &self.value);
        Ok(match self.operator {
            Operator::Equal => loose_eq(actual, &self.value),
            Operator::NotEqual => !actual.is_null() && !loose_eq(actual, &self.value),
            Operator::GreaterThan => ordering() == Some(Ordering::Greater),
            Operator::GreaterThanOrEqual => {
                matches!(ordering(), Some(Ordering::Greater | Ordering::Equal))
            }
            Operator::LessThan => ordering() == Some(Ordering::Less),
            Operator::LessThanOrEqual => {
                matches!(ordering(), Some(Ordering::Less | Ordering::Equal))
            }
            Operator::Like => match (text(actual), self.value.as_str()) {
                (Some(haystack), Some(pattern)) => like(&haystack, pattern),
                _ => false,
            },
            Operator::In => self
                .value
                .as_array()
                .is_some_and(|values| values.iter().any(|v| loose_eq(actual, v))),
            Operator::IsNull => actual.is_null(),
            Operator::IsNotNull => !actual.is_null(),
        })
    }
}

/// What to fetch from a store: conditions, eager loads and ordering.
pub struct Query<M> {
    conditions: Vec<Condition>,
    relations: Vec<String>,
    order_by: Vec<(String, SortOrder)>,
    _model: PhantomData<fn() -> M>,
}

impl<M> Query<M> {
    /// An unfiltered query over every record.
    pub fn new() -> Self {
        Self {
            conditions: Vec::new(),
            relations: Vec::new(),
            order_by: Vec::new(),
            _model: PhantomData,
        }
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(Condition::eq(field, value))
    }

    pub fn where_null(self, field: impl Into<String>) -> Self {
        self.filter(Condition::is_null(field))
    }

    /// Eager load relations. Names are appended as given; duplicates are kept.
    pub fn with<I, S>(mut self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relations.extend(relations.into_iter().map(Into::into));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.order_by.push((field.into(), order));
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn relations(&self) -> &[String] {
        &self.relations
    }

    pub fn orders(&self) -> &[(String, SortOrder)] {
        &self.order_by
    }

    /// Add an equality condition for every listed field present in `params` or the request.
    ///
    /// Explicit `params` win over request values; empty values are skipped.
    pub fn filter_from(mut self, request: &ApiRequest, params: &FilterParams, fields: &[&str]) -> Self {
        for field in fields {
            let value = params
                .get(*field)
                .map(String::as_str)
                .or_else(|| request.get(field));
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                self = self.where_eq(*field, value);
            }
        }
        self
    }

    /// Apply the `sort` parameter (`sort=-price,name`) restricted to `sortable` fields.
    pub fn sort_from(mut self, request: &ApiRequest, sortable: &[&str]) -> Self {
        let Some(sort) = request.get("sort") else {
            return self;
        };
        for token in sort.split(',') {
            let (field, order) = match token.strip_prefix('-') {
                Some(field) => (field, SortOrder::Desc),
                None => (token, SortOrder::Asc),
            };
            if sortable.contains(&field) {
                self = self.order_by(field, order);
            }
        }
        self
    }
}

impl<M: Model> Query<M> {
    /// Run the conditions and ordering over `records`.
    ///
    /// Records keep their input order unless sort clauses say otherwise.
    pub fn apply<'a, I>(&self, records: I) -> Result<Vec<M>, StoreError>
    where
        I: IntoIterator<Item = &'a M>,
    {
        let mut rows = Vec::new();
        for record in records {
            let attributes = record.attributes()?;
            if self.matches(&attributes)? {
                rows.push((attributes, record.clone()));
            }
        }
        for (field, _) in &self.order_by {
            if let Some((attributes, _)) = rows.first() {
                if !attributes.contains_key(field) {
                    return Err(StoreError::UnknownColumn(field.clone()));
                }
            }
        }
        if !self.order_by.is_empty() {
            rows.sort_by(|(a, _), (b, _)| {
                for (field, order) in &self.order_by {
                    let ordering = sort_key_cmp(a.get(field), b.get(field));
                    let ordering = match order {
                        SortOrder::Asc => ordering,
                        SortOrder::Desc => ordering.reverse(),
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
        }
        Ok(rows.into_iter().map(|(_, record)| record).collect())
    }

    /// True when every condition holds for `record`.
    pub fn matches_record(&self, record: &M) -> Result<bool, StoreError> {
        self.matches(&record.attributes()?)
    }

    fn matches(&self, attributes: &Map<String, Value>) -> Result<bool, StoreError> {
        for condition in &self.conditions {
            if !condition.matches(attributes)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl<M> Default for Query<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for Query<M> {
    fn clone(&self) -> Self {
        Self {
            conditions: self.conditions.clone(),
            relations: self.relations.clone(),
            order_by: self.order_by.clone(),
            _model: PhantomData,
        }
    }
}

impl<M> PartialEq for Query<M> {
    fn eq(&self, other: &Self) -> bool {
        self.conditions == other.conditions
            && self.relations == other.relations
            && self.order_by == other.order_by
    }
}

impl<M> fmt::Debug for Query<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("conditions", &self.conditions)
            .field("relations", &self.relations)
            .field("order_by", &self.order_by)
            .finish()
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => match s.as_str() {
            "true" => Some(1.0),
            "false" => Some(0.0),
            other => other.trim().parse().ok(),
        },
        _ => None,
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, _) | (_, Value::Null) => None,
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => numeric(a)?.partial_cmp(&numeric(b)?),
    }
}

fn loose_eq(a: &Value, b: &Value) -> bool {
    a == b || compare(a, b) == Some(Ordering::Equal)
}

// NULLs (and missing attributes) sort first.
fn sort_key_cmp(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare(a, b).unwrap_or(Ordering::Equal),
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn like(haystack: &str, pattern: &str) -> bool {
    let haystack: Vec<char> = haystack.to_lowercase().chars().collect();
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
    // matched[j]: pattern[..j] matches the haystack prefix consumed so far
    let mut matched = vec![false; pattern.len() + 1];
    matched[0] = true;
    for j in 1..=pattern.len() {
        matched[j] = matched[j - 1] && pattern[j - 1] == '%';
    }
    for c in haystack {
        let mut next = vec![false; pattern.len() + 1];
        for j in 1..=pattern.len() {
            next[j] = match pattern[j - 1] {
                '%' => next[j - 1] || matched[j],
                '_' => matched[j - 1],
                p => matched[j - 1] && p == c,
            };
        }
        matched = next;
    }
    matched[pattern.len()]
}
