//! Documents, records and values.
//!
//! A [`Document`] is addressed by URL and holds any number of [`Record`]s,
//! each keyed by its subject URL. A record maps predicate identifiers to a
//! set of [`Value`]s. Subjects do not have to live in the document that holds
//! them: an index document stores records about entities in other documents.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::resource::ResourceUrl;

/// A single attribute value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// A scalar (string-encoded) value.
    Literal(String),
    /// A reference to a resource or to a subject in some document.
    Url(ResourceUrl),
}

impl Value {
    pub fn literal(value: impl Into<String>) -> Self {
        Value::Literal(value.into())
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Value::Literal(s) => Some(s),
            Value::Url(_) => None,
        }
    }

    pub fn as_url(&self) -> Option<&ResourceUrl> {
        match self {
            Value::Url(u) => Some(u),
            Value::Literal(_) => None,
        }
    }
}

impl From<ResourceUrl> for Value {
    fn from(url: ResourceUrl) -> Self {
        Value::Url(url)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Literal(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Literal(s)
    }
}

/// The attributes of one subject.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    subject: ResourceUrl,
    attributes: BTreeMap<String, BTreeSet<Value>>,
}

impl Record {
    pub fn new(subject: ResourceUrl) -> Self {
        Self {
            subject,
            attributes: BTreeMap::new(),
        }
    }

    pub fn subject(&self) -> &ResourceUrl {
        &self.subject
    }

    /// All values of a predicate, in sorted order.
    pub fn values(&self, predicate: &str) -> impl Iterator<Item = &Value> {
        self.attributes.get(predicate).into_iter().flatten()
    }

    pub fn first(&self, predicate: &str) -> Option<&Value> {
        self.values(predicate).next()
    }

    pub fn first_literal(&self, predicate: &str) -> Option<&str> {
        self.values(predicate).find_map(Value::as_literal)
    }

    pub fn first_url(&self, predicate: &str) -> Option<&ResourceUrl> {
        self.values(predicate).find_map(Value::as_url)
    }

    /// All URL values of a predicate; literals are skipped.
    pub fn urls(&self, predicate: &str) -> impl Iterator<Item = &ResourceUrl> {
        self.values(predicate).filter_map(Value::as_url)
    }

    pub fn has(&self, predicate: &str, value: &Value) -> bool {
        self.attributes
            .get(predicate)
            .is_some_and(|values| values.contains(value))
    }

    /// Replace every value of `predicate` with `value`.
    pub fn set(&mut self, predicate: impl Into<String>, value: Value) {
        let mut values = BTreeSet::new();
        values.insert(value);
        self.attributes.insert(predicate.into(), values);
    }

    /// Add a value. Returns `false` if it was already present.
    pub fn add(&mut self, predicate: impl Into<String>, value: Value) -> bool {
        self.attributes.entry(predicate.into()).or_default().insert(value)
    }

    /// Remove a value. Returns `false` if it was not present.
    pub fn remove(&mut self, predicate: &str, value: &Value) -> bool {
        let Some(values) = self.attributes.get_mut(predicate) else {
            return false;
        };
        let removed = values.remove(value);
        if values.is_empty() {
            self.attributes.remove(predicate);
        }
        removed
    }

    /// Drop every value of a predicate. Returns `true` if any existed.
    pub fn clear(&mut self, predicate: &str) -> bool {
        self.attributes.remove(predicate).is_some()
    }

    pub fn predicates(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    /// Number of (predicate, value) pairs.
    pub fn len(&self) -> usize {
        self.attributes.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// A remotely stored document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    url: ResourceUrl,
    records: BTreeMap<ResourceUrl, Record>,
}

impl Document {
    /// An empty document. Any fragment on `url` is dropped.
    pub fn new(url: ResourceUrl) -> Self {
        Self {
            url: url.document(),
            records: BTreeMap::new(),
        }
    }

    pub fn url(&self) -> &ResourceUrl {
        &self.url
    }

    pub fn record(&self, subject: &ResourceUrl) -> Option<&Record> {
        self.records.get(subject)
    }

    pub fn record_mut(&mut self, subject: &ResourceUrl) -> Option<&mut Record> {
        self.records.get_mut(subject)
    }

    /// The record for `subject`, inserting an empty one if absent.
    pub fn record_entry(&mut self, subject: &ResourceUrl) -> &mut Record {
        self.records
            .entry(subject.clone())
            .or_insert_with(|| Record::new(subject.clone()))
    }

    pub fn contains(&self, subject: &ResourceUrl) -> bool {
        self.records.contains_key(subject)
    }

    /// Insert or wholly replace the record keyed by its subject.
    ///
    /// Repeating the same upsert leaves the document unchanged.
    pub fn upsert(&mut self, record: Record) -> Option<Record> {
        self.records.insert(record.subject().clone(), record)
    }

    pub fn remove(&mut self, subject: &ResourceUrl) -> Option<Record> {
        self.records.remove(subject)
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
