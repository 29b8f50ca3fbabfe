//! mqldoc Core - Fluent builders for MQL query documents
//!
//! This crate provides:
//! - An ordered key/value [`Document`] that keeps duplicate keys
//! - Filter, sort and projection builders that produce documents
//! - BSON encoding and decoding with size and nesting limits
//! - TOML configuration and tracing-based logging setup
//!
//! ```
//! use mqldoc_core::{FilterBuilder, ProjectionBuilder, SortBuilder};
//!
//! let filter = FilterBuilder::new().eq("a", 1).gt("b", 2).doc();
//! assert_eq!(filter.to_string(), r#"{ "a": 1, "b": { "$gt": 2 } }"#);
//!
//! let sort = SortBuilder::new().order_desc_by(["createdAt"]).doc();
//! assert_eq!(sort.len(), 1);
//!
//! let projection = ProjectionBuilder::new().include(["x", "y", "x"]).doc();
//! assert_eq!(projection.keys().collect::<Vec<_>>(), vec!["y", "x"]);
//!
//! let bytes = filter.encode().unwrap();
//! assert_eq!(mqldoc_core::Document::decode(&bytes).unwrap(), filter);
//! ```

pub mod codec;
pub mod config;
pub mod document;
pub mod logging;
pub mod query;

pub use codec::{Codec, CodecConfig, MAX_DOCUMENT_SIZE, MAX_NESTING_DEPTH};
pub use config::Config;
pub use document::{Document, DocumentError, Entry, Value};
pub use logging::{init_logging, LoggingConfig};
pub use query::{
    BitTest, FilterBuilder, ProjectionBuilder, SortBuilder, SortOrder, TextSearchOptions,
    TypeSpec,
};
