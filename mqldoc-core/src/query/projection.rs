//! Projection document builder
//!
//! Projection entries are idempotent per field: finalizing keeps one entry
//! per key, holding the last value written and positioned where that key
//! was last mentioned.

use std::collections::HashSet;

use tracing::debug;

use super::chain::EntryChain;
use super::ops;
use crate::document::{Document, Entry, Value};

/// Inclusion marker
pub const INCLUDE: i32 = 1;
/// Exclusion marker
pub const EXCLUDE: i32 = 0;
/// Reserved identifier field
pub const ID_FIELD: &str = "_id";
/// `$meta` name of the text search relevance score
pub const TEXT_SCORE: &str = "textScore";

/// Builder for MQL projection documents
#[derive(Debug, Clone, Default)]
pub struct ProjectionBuilder {
    entries: EntryChain,
}

impl ProjectionBuilder {
    pub fn new() -> Self {
        Self {
            entries: EntryChain::new(),
        }
    }

    /// Number of accumulated entries, duplicates included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() == 0
    }

    /// Finalize into a document with one entry per field.
    ///
    /// `include(["x", "y", "x"])` yields `{ y: 1, x: 1 }`.
    pub fn doc(&self) -> Document {
        let mut seen: HashSet<&str> = HashSet::with_capacity(self.entries.len());
        let mut kept: Vec<Entry> = Vec::with_capacity(self.entries.len());

        // Newest first, so the first hit for a key is its last write.
        for entry in self.entries.iter_rev() {
            if seen.insert(entry.key()) {
                kept.push(entry.clone());
            }
        }
        kept.reverse();

        if kept.len() < self.entries.len() {
            debug!(
                accumulated = self.entries.len(),
                kept = kept.len(),
                "collapsed duplicate projection fields"
            );
        }

        Document::from_entries(kept)
    }

    /// Set `field` to an explicit projection value
    pub fn field(&self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            entries: self.entries.push(Entry::new(field, value)),
        }
    }

    /// Include each field (`field: 1`)
    pub fn include<S: Into<String>>(&self, fields: impl IntoIterator<Item = S>) -> Self {
        fields
            .into_iter()
            .fold(self.clone(), |builder, field| builder.field(field, INCLUDE))
    }

    /// Exclude each field (`field: 0`)
    pub fn exclude<S: Into<String>>(&self, fields: impl IntoIterator<Item = S>) -> Self {
        fields
            .into_iter()
            .fold(self.clone(), |builder, field| builder.field(field, EXCLUDE))
    }

    /// Suppress the `_id` field that is otherwise always returned
    pub fn exclude_id(&self) -> Self {
        self.field(ID_FIELD, EXCLUDE)
    }

    /// Project only the first array element matching `filter`
    pub fn elem_match(&self, field: impl Into<String>, filter: impl Into<Document>) -> Self {
        self.field(field, single(ops::ELEM_MATCH, Value::Document(filter.into())))
    }

    /// `{ field: { $slice: limit } }`
    ///
    /// A negative limit counts from the end of the array.
    pub fn slice(&self, field: impl Into<String>, limit: i64) -> Self {
        self.field(field, single(ops::SLICE, limit))
    }

    /// `{ field: { $slice: [skip, limit] } }`
    pub fn slice_with_skip(&self, field: impl Into<String>, skip: i64, limit: i64) -> Self {
        self.field(field, single(ops::SLICE, [skip, limit]))
    }

    /// `{ field: { $meta: meta_field } }`
    pub fn meta(&self, field: impl Into<String>, meta_field: impl Into<String>) -> Self {
        let meta_field: String = meta_field.into();
        self.field(field, single(ops::META, meta_field))
    }

    /// Project the text search score into `field`
    pub fn meta_text_score(&self, field: impl Into<String>) -> Self {
        self.meta(field, TEXT_SCORE)
    }
}

fn single(op: &str, value: impl Into<Value>) -> Document {
    Document::from_entries(vec![Entry::new(op, value)])
}
