//! Document, Entry and Value types for query documents
//!
//! This module provides the common output type of every builder:
//! - Document: an ordered, immutable sequence of key/value entries
//! - Entry: a single key/value pair (field name or operator token)
//! - Value: a BSON leaf, an array, or a nested ordered document
//!
//! Unlike `bson::Document`, a `Document` keeps duplicate keys. Filters that
//! name the same field twice stay intact in the ordered view and on the wire;
//! only the key-map view collapses them.

use bson::oid::ObjectId;
use bson::{Binary, Bson, Decimal128, JavaScriptCodeWithScope, Regex, Timestamp};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;

use crate::codec::Codec;

/// A single key/value pair inside a document
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    key: String,
    value: Value,
}

impl Entry {
    /// Create a new entry
    ///
    /// Containers passed as `Value::Bson` are normalised, so the entry
    /// compares equal to its decoded form.
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into().normalized(),
        }
    }

    /// Field name or operator token
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Entry value
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Split the entry into its key and value
    pub fn into_parts(self) -> (String, Value) {
        (self.key, self.value)
    }
}

impl<K: Into<String>, V: Into<Value>> From<(K, V)> for Entry {
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}

/// Value held by an entry
///
/// Build values through the `From` conversions: they normalise embedded
/// `Bson::Document` and `Bson::Array` into `Value::Document` and
/// `Value::Array`, which is also the shape `Document::decode` produces.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Any non-container BSON value (numbers, strings, regex, code, ...)
    Bson(Bson),
    /// Array of values
    Array(Vec<Value>),
    /// Nested ordered document
    Document(Document),
}

impl Value {
    /// Check if value is a nested document
    pub fn is_document(&self) -> bool {
        matches!(self, Value::Document(_))
    }

    /// Check if value is an array
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Get as leaf BSON reference
    pub fn as_bson(&self) -> Option<&Bson> {
        match self {
            Value::Bson(b) => Some(b),
            _ => None,
        }
    }

    /// Get as array reference
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Get as nested document reference
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// Get as string slice
    pub fn as_str(&self) -> Option<&str> {
        self.as_bson().and_then(Bson::as_str)
    }

    /// Get as i32
    pub fn as_i32(&self) -> Option<i32> {
        self.as_bson().and_then(Bson::as_i32)
    }

    /// Get as i64
    pub fn as_i64(&self) -> Option<i64> {
        self.as_bson().and_then(Bson::as_i64)
    }

    /// Convert into a `Bson` value.
    ///
    /// Nested documents go through the key-map view, so duplicate keys
    /// below this value collapse (last write wins).
    pub fn to_bson(&self) -> Bson {
        match self {
            Value::Bson(b) => b.clone(),
            Value::Array(items) => Bson::Array(items.iter().map(Value::to_bson).collect()),
            Value::Document(doc) => Bson::Document(doc.to_key_map()),
        }
    }

    // Rewrite `Bson::Document`/`Bson::Array` leaves into their structural form.
    fn normalized(self) -> Value {
        match self {
            Value::Bson(b) => Value::from(b),
            Value::Array(items) => Value::Array(items.into_iter().map(Value::normalized).collect()),
            doc @ Value::Document(_) => doc,
        }
    }

    /// Get the nesting depth of this value
    pub fn nesting_depth(&self) -> usize {
        match self {
            Value::Bson(_) => 0,
            Value::Array(items) => {
                1 + items.iter().map(Value::nesting_depth).max().unwrap_or(0)
            }
            Value::Document(doc) => 1 + doc.nesting_depth(),
        }
    }
}

impl From<Bson> for Value {
    fn from(value: Bson) -> Self {
        match value {
            Bson::Document(doc) => Value::Document(doc.into()),
            Bson::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            other => Value::Bson(other),
        }
    }
}

impl From<bson::Document> for Value {
    fn from(doc: bson::Document) -> Self {
        Value::Document(doc.into())
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Value::Document(doc)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(items: [T; N]) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

macro_rules! leaf_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Bson(Bson::from(v))
                }
            }
        )*
    };
}

leaf_from!(
    bool,
    i32,
    i64,
    f64,
    &str,
    String,
    ObjectId,
    bson::DateTime,
    Regex,
    JavaScriptCodeWithScope,
    Timestamp,
    Binary,
    Decimal128,
);

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Bson(b) => b.serialize(serializer),
            Value::Array(items) => serializer.collect_seq(items),
            Value::Document(doc) => doc.serialize(serializer),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bson(b) => write!(f, "{}", b),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Document(doc) => write!(f, "{}", doc),
        }
    }
}

/// Ordered, immutable sequence of entries
///
/// Produced by `FilterBuilder::doc`, `SortBuilder::doc` and
/// `ProjectionBuilder::doc`, or decoded from BSON bytes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    entries: Vec<Entry>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from already ordered entries
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    /// Entries in document order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Iterate entries in document order
    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Consume the document, returning its ordered entries
    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    /// Number of entries (duplicates counted)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in document order, duplicates included
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(Entry::key)
    }

    /// Value of the last entry with this key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.key == key)
            .map(Entry::value)
    }

    /// Check if a key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    /// Collapse into a key-unique map (last write wins).
    ///
    /// This view is lossy when keys repeat; use `entries` or `encode` when
    /// every entry must reach the server.
    pub fn to_key_map(&self) -> bson::Document {
        let mut map = bson::Document::new();
        for entry in &self.entries {
            map.insert(entry.key.clone(), entry.value.to_bson());
        }
        map
    }

    /// Deepest nesting level below the top-level entries
    pub fn nesting_depth(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.value.nesting_depth())
            .max()
            .unwrap_or(0)
    }

    /// Encode to BSON bytes with the default codec limits
    pub fn encode(&self) -> Result<Vec<u8>, DocumentError> {
        Codec::default().encode(self)
    }

    /// Decode from BSON bytes with the default codec limits
    pub fn decode(bytes: &[u8]) -> Result<Self, DocumentError> {
        Codec::default().decode(bytes)
    }
}

impl From<bson::Document> for Document {
    fn from(doc: bson::Document) -> Self {
        Self {
            entries: doc.into_iter().map(|(k, v)| Entry::new(k, v)).collect(),
        }
    }
}

impl From<Document> for bson::Document {
    fn from(doc: Document) -> Self {
        doc.to_key_map()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(Entry::from).collect(),
        }
    }
}

impl FromIterator<Entry> for Document {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Document {
    type Item = Entry;
    type IntoIter = std::vec::IntoIter<Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// Serialized as a map whose entries keep document order, duplicates included.
impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.key, &entry.value)?;
        }
        map.end()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return f.write_str("{}");
        }
        f.write_str("{ ")?;
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "\"{}\": {}", entry.key, entry.value)?;
        }
        f.write_str(" }")
    }
}

/// Document-related errors
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Document too large: {size} bytes (max: {max})")]
    DocumentTooLarge { size: usize, max: usize },

    #[error("Nesting too deep: {depth} levels (max: {max})")]
    NestingTooDeep { depth: usize, max: usize },

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn sample() -> Document {
        Document::from_entries(vec![
            Entry::new("a", 1i32),
            Entry::new("b", Document::from_entries(vec![Entry::new("$gt", 2i32)])),
            Entry::new("a", 3i32),
        ])
    }

    #[test]
    fn test_entry_accessors() {
        let entry = Entry::new("name", "John");
        assert_eq!(entry.key(), "name");
        assert_eq!(entry.value().as_str(), Some("John"));

        let (k, v) = entry.into_parts();
        assert_eq!(k, "name");
        assert_eq!(v, Value::Bson(Bson::String("John".to_string())));
    }

    #[test]
    fn test_value_conversions() {
        let v: Value = 42i32.into();
        assert_eq!(v.as_i32(), Some(42));

        let v: Value = 42i64.into();
        assert_eq!(v.as_i64(), Some(42));

        let v: Value = vec![1i32, 2].into();
        assert_eq!(v.as_array().map(|a| a.len()), Some(2));

        let v: Value = ["x", "y"].into();
        assert!(v.is_array());
    }

    #[test]
    fn test_bson_normalisation() {
        let v = Value::from(Bson::Document(doc! { "x": [1, { "y": 2 }] }));
        let inner = v.as_document().unwrap();
        let arr = inner.get("x").unwrap().as_array().unwrap();
        assert!(arr[0].as_bson().is_some());
        assert!(arr[1].is_document());
    }

    #[test]
    fn test_entry_normalises_bson_containers() {
        let entry = Entry::new("a", Value::Bson(Bson::Array(vec![1.into()])));
        assert_eq!(entry.value(), &Value::Array(vec![Value::from(1i32)]));

        let nested = Entry::new(
            "b",
            Value::Array(vec![Value::Bson(Bson::Document(doc! { "c": 2 }))]),
        );
        let items = nested.value().as_array().unwrap();
        assert!(items[0].is_document());
    }

    #[test]
    fn test_ordered_view_keeps_duplicates() {
        let doc = sample();
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["a", "b", "a"]);
        assert_eq!(doc.get("a").and_then(Value::as_i32), Some(3));
    }

    #[test]
    fn test_key_map_last_write_wins() {
        let map = sample().to_key_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get_i32("a").unwrap(), 3);
        assert_eq!(map.get_document("b").unwrap(), &doc! { "$gt": 2 });
    }

    #[test]
    fn test_nesting_depth() {
        assert_eq!(Document::new().nesting_depth(), 0);
        assert_eq!(sample().nesting_depth(), 1);

        let deep: Document = vec![("a", Value::from(doc! { "b": { "c": [1] } }))]
            .into_iter()
            .collect();
        assert_eq!(deep.nesting_depth(), 3);
    }

    #[test]
    fn test_display() {
        assert_eq!(Document::new().to_string(), "{}");
        assert_eq!(
            sample().to_string(),
            "{ \"a\": 1, \"b\": { \"$gt\": 2 }, \"a\": 3 }"
        );
    }

    #[test]
    fn test_serialize_keeps_order() {
        let doc: Document = vec![("z", 1i32), ("a", 2i32)].into_iter().collect();
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(json, r#"{"z":1,"a":2}"#);
    }

    #[test]
    fn test_from_bson_document() {
        let doc = Document::from(doc! { "x": 1, "y": "two" });
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(bson::Document::from(doc), doc! { "x": 1, "y": "two" });
    }
}
