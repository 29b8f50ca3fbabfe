//! Sort document builder

use serde::{Deserialize, Serialize};

use super::chain::EntryChain;
use crate::document::{Document, Entry, Value};

/// Sort order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Ascending order (1)
    Ascending,
    /// Descending order (-1)
    Descending,
}

impl SortOrder {
    /// Direction value as sent to the server
    pub fn as_i32(self) -> i32 {
        match self {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }
}

impl From<SortOrder> for Value {
    fn from(order: SortOrder) -> Self {
        Value::from(order.as_i32())
    }
}

/// Builder for MQL sort documents
///
/// Fields keep call order. Repeating a field keeps both entries; precedence
/// is left to the server.
#[derive(Debug, Clone, Default)]
pub struct SortBuilder {
    entries: EntryChain,
}

impl SortBuilder {
    pub fn new() -> Self {
        Self {
            entries: EntryChain::new(),
        }
    }

    /// Number of accumulated entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() == 0
    }

    /// Finalize into a document, fields in call order
    pub fn doc(&self) -> Document {
        Document::from_entries(self.entries.to_vec())
    }

    /// Sort by `field` in the given order
    pub fn order_by(&self, field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            entries: self.entries.push(Entry::new(field, order)),
        }
    }

    /// Sort by each field ascending, in argument order
    pub fn order_asc_by<S: Into<String>>(&self, fields: impl IntoIterator<Item = S>) -> Self {
        self.order_all(fields, SortOrder::Ascending)
    }

    /// Sort by each field descending, in argument order
    pub fn order_desc_by<S: Into<String>>(&self, fields: impl IntoIterator<Item = S>) -> Self {
        self.order_all(fields, SortOrder::Descending)
    }

    fn order_all<S: Into<String>>(
        &self,
        fields: impl IntoIterator<Item = S>,
        order: SortOrder,
    ) -> Self {
        fields
            .into_iter()
            .fold(self.clone(), |builder, field| builder.order_by(field, order))
    }
}
