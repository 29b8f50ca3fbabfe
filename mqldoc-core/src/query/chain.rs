//! Persistent append-only entry chain
//!
//! Every builder wraps one of these. Appending creates a new link that points
//! back at the previous tail, so builders that share a prefix share its
//! links instead of copying them, and the base builder never changes.

use std::sync::Arc;

use crate::document::Entry;

#[derive(Debug)]
struct Link {
    entry: Entry,
    prev: Option<Arc<Link>>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct EntryChain {
    tail: Option<Arc<Link>>,
    len: usize,
}

impl EntryChain {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Return a new chain with `entry` appended
    pub(crate) fn push(&self, entry: Entry) -> Self {
        Self {
            tail: Some(Arc::new(Link {
                entry,
                prev: self.tail.clone(),
            })),
            len: self.len + 1,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Iterate from the newest entry back to the oldest
    pub(crate) fn iter_rev(&self) -> RevIter<'_> {
        RevIter {
            next: self.tail.as_deref(),
        }
    }

    /// Entries in insertion order
    pub(crate) fn to_vec(&self) -> Vec<Entry> {
        let mut entries: Vec<Entry> = Vec::with_capacity(self.len);
        entries.extend(self.iter_rev().cloned());
        entries.reverse();
        entries
    }
}

// Unlink iteratively; the default drop would recurse once per link.
impl Drop for EntryChain {
    fn drop(&mut self) {
        let mut next = self.tail.take();
        while let Some(link) = next {
            match Arc::try_unwrap(link) {
                Ok(mut link) => next = link.prev.take(),
                Err(_) => break,
            }
        }
    }
}

pub(crate) struct RevIter<'a> {
    next: Option<&'a Link>,
}

impl<'a> Iterator for RevIter<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        let link = self.next?;
        self.next = link.prev.as_deref();
        Some(&link.entry)
    }
}
