//! BSON encoding and decoding for documents
//!
//! Goes through the raw document API of the `bson` crate, which writes and
//! reads elements one at a time. That keeps key order and duplicate keys
//! intact at every nesting level, which `bson::Document` cannot do.

use bson::raw::{RawArray, RawBson, RawBsonRef, RawDocument, RawJavaScriptCodeWithScope};
use bson::{Bson, RawArrayBuf, RawDocumentBuf};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::document::{Document, DocumentError, Value};

/// Maximum document size in bytes (16 MB)
pub const MAX_DOCUMENT_SIZE: usize = 16 * 1024 * 1024;

/// Maximum nesting depth for documents (100 levels)
pub const MAX_NESTING_DEPTH: usize = 100;

/// Codec limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Largest encoded document accepted or produced, in bytes
    pub max_document_size: usize,
    /// Deepest nesting of documents and arrays accepted or produced
    pub max_nesting_depth: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_document_size: MAX_DOCUMENT_SIZE,
            max_nesting_depth: MAX_NESTING_DEPTH,
        }
    }
}

/// Converts documents to and from BSON bytes
#[derive(Debug, Clone, Default)]
pub struct Codec {
    config: CodecConfig,
}

impl Codec {
    /// Create a codec with the given limits
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode a document to BSON bytes
    pub fn encode(&self, doc: &Document) -> Result<Vec<u8>, DocumentError> {
        let depth = doc.nesting_depth();
        if depth > self.config.max_nesting_depth {
            return Err(DocumentError::NestingTooDeep {
                depth,
                max: self.config.max_nesting_depth,
            });
        }

        let raw = self.write_document(doc)?;
        let bytes = raw.into_bytes();

        if bytes.len() > self.config.max_document_size {
            return Err(DocumentError::DocumentTooLarge {
                size: bytes.len(),
                max: self.config.max_document_size,
            });
        }

        trace!(entries = doc.len(), bytes = bytes.len(), "encoded document");
        Ok(bytes)
    }

    /// Decode a document from BSON bytes
    pub fn decode(&self, bytes: &[u8]) -> Result<Document, DocumentError> {
        if bytes.len() > self.config.max_document_size {
            return Err(DocumentError::DocumentTooLarge {
                size: bytes.len(),
                max: self.config.max_document_size,
            });
        }

        let result = RawDocument::from_bytes(bytes)
            .map_err(decode_error)
            .and_then(|raw| self.read_document(raw, 1));

        match &result {
            Ok(doc) => trace!(entries = doc.len(), bytes = bytes.len(), "decoded document"),
            Err(e) => debug!(error = %e, bytes = bytes.len(), "failed to decode document"),
        }
        result
    }

    fn check_depth(&self, level: usize) -> Result<(), DocumentError> {
        if level > self.config.max_nesting_depth {
            return Err(DocumentError::NestingTooDeep {
                depth: level,
                max: self.config.max_nesting_depth,
            });
        }
        Ok(())
    }

    // Depth is checked up front in `encode`.
    fn write_document(&self, doc: &Document) -> Result<RawDocumentBuf, DocumentError> {
        let mut raw = RawDocumentBuf::new();
        for entry in doc {
            check_cstr(entry.key())?;
            raw.append(entry.key(), self.write_value(entry.value())?);
        }
        Ok(raw)
    }

    fn write_value(&self, value: &Value) -> Result<RawBson, DocumentError> {
        match value {
            Value::Document(doc) => Ok(RawBson::Document(self.write_document(doc)?)),
            Value::Array(items) => {
                let mut raw = RawArrayBuf::new();
                for item in items {
                    raw.push(self.write_value(item)?);
                }
                Ok(RawBson::Array(raw))
            }
            Value::Bson(b) => leaf_to_raw(b),
        }
    }

    fn read_document(&self, raw: &RawDocument, level: usize) -> Result<Document, DocumentError> {
        let mut entries = Vec::new();
        for element in raw {
            let (key, value) = element.map_err(decode_error)?;
            entries.push((key.to_string(), self.read_value(value, level)?));
        }
        Ok(entries.into_iter().collect())
    }

    fn read_array(&self, raw: &RawArray, level: usize) -> Result<Vec<Value>, DocumentError> {
        let mut items = Vec::new();
        for element in raw {
            let value = element.map_err(decode_error)?;
            items.push(self.read_value(value, level)?);
        }
        Ok(items)
    }

    fn read_value(&self, value: RawBsonRef<'_>, level: usize) -> Result<Value, DocumentError> {
        match value {
            RawBsonRef::Document(doc) => {
                self.check_depth(level)?;
                Ok(Value::Document(self.read_document(doc, level + 1)?))
            }
            RawBsonRef::Array(arr) => {
                self.check_depth(level)?;
                Ok(Value::Array(self.read_array(arr, level + 1)?))
            }
            leaf => Bson::try_from(leaf.to_raw_bson())
                .map(Value::Bson)
                .map_err(decode_error),
        }
    }
}

fn decode_error(e: impl std::fmt::Display) -> DocumentError {
    DocumentError::Decode(e.to_string())
}

// Keys and regex parts are C strings on the wire.
fn check_cstr(s: &str) -> Result<(), DocumentError> {
    if s.contains('\0') {
        return Err(DocumentError::Encode(format!(
            "string contains NUL byte: {:?}",
            s
        )));
    }
    Ok(())
}

#[allow(unreachable_patterns)]
fn leaf_to_raw(b: &Bson) -> Result<RawBson, DocumentError> {
    let raw = match b {
        Bson::Double(v) => RawBson::Double(*v),
        Bson::String(s) => RawBson::String(s.clone()),
        Bson::Boolean(v) => RawBson::Boolean(*v),
        Bson::Null => RawBson::Null,
        Bson::RegularExpression(re) => {
            check_cstr(&re.pattern)?;
            check_cstr(&re.options)?;
            RawBson::RegularExpression(re.clone())
        }
        Bson::JavaScriptCode(code) => RawBson::JavaScriptCode(code.clone()),
        Bson::JavaScriptCodeWithScope(cws) => {
            let scope = RawDocumentBuf::from_document(&cws.scope)
                .map_err(|e| DocumentError::Encode(e.to_string()))?;
            RawBson::JavaScriptCodeWithScope(RawJavaScriptCodeWithScope {
                code: cws.code.clone(),
                scope,
            })
        }
        Bson::Int32(v) => RawBson::Int32(*v),
        Bson::Int64(v) => RawBson::Int64(*v),
        Bson::Timestamp(ts) => RawBson::Timestamp(*ts),
        Bson::Binary(bin) => RawBson::Binary(bin.clone()),
        Bson::ObjectId(oid) => RawBson::ObjectId(*oid),
        Bson::DateTime(dt) => RawBson::DateTime(*dt),
        Bson::Symbol(s) => RawBson::Symbol(s.clone()),
        Bson::Decimal128(d) => RawBson::Decimal128(*d),
        Bson::Undefined => RawBson::Undefined,
        Bson::MaxKey => RawBson::MaxKey,
        Bson::MinKey => RawBson::MinKey,
        Bson::DbPointer(p) => RawBson::DbPointer(p.clone()),
        other => {
            return Err(DocumentError::Encode(format!(
                "unsupported BSON value: {:?}",
                other.element_type()
            )))
        }
    };
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Entry;
    use bson::oid::ObjectId;
    use bson::{doc, JavaScriptCodeWithScope, Regex};

    fn nested(depth: usize) -> Document {
        let mut value = Value::from(1i32);
        for _ in 0..depth {
            value = Value::Document(Document::from_entries(vec![Entry::new("n", value)]));
        }
        Document::from_entries(vec![Entry::new("root", value)])
    }

    #[test]
    fn test_encode_matches_bson_crate() {
        let doc: Document = vec![("a", Value::from(1i32)), ("b", Value::from(doc! { "$gt": 2 }))]
            .into_iter()
            .collect();
        let expected = bson::to_vec(&doc! { "a": 1, "b": { "$gt": 2 } }).unwrap();
        assert_eq!(Codec::default().encode(&doc).unwrap(), expected);
    }

    #[test]
    fn test_round_trip_extended_types() {
        let doc = Document::from_entries(vec![
            Entry::new("re", Regex { pattern: "^acme".to_string(), options: "i".to_string() }),
            Entry::new(
                "code",
                JavaScriptCodeWithScope { code: "x + y".to_string(), scope: doc! { "x": 1 } },
            ),
            Entry::new("oid", ObjectId::new()),
            Entry::new("when", bson::DateTime::from_millis(1_700_000_000_000)),
            Entry::new("f", 1.5f64),
            Entry::new("big", i64::MAX),
            Entry::new("null", Bson::Null),
        ]);

        let codec = Codec::default();
        let bytes = codec.encode(&doc).unwrap();
        let decoded = codec.decode(&bytes).unwrap();
        assert_eq!(decoded, doc);
        assert_eq!(codec.encode(&decoded).unwrap(), bytes);
    }

    #[test]
    fn test_duplicate_keys_survive() {
        let inner = Document::from_entries(vec![
            Entry::new("age", doc! { "$gte": 18 }),
            Entry::new("age", doc! { "$lt": 65 }),
        ]);
        let doc = Document::from_entries(vec![
            Entry::new("$and", vec![Value::Document(inner)]),
            Entry::new("k", 1i32),
            Entry::new("k", 2i32),
        ]);

        let codec = Codec::default();
        let decoded = codec.decode(&codec.encode(&doc).unwrap()).unwrap();
        assert_eq!(decoded, doc);
        assert_eq!(decoded.len(), 3);
    }

    #[test]
    fn test_decode_malformed() {
        let codec = Codec::default();
        assert!(matches!(codec.decode(&[]), Err(DocumentError::Decode(_))));
        assert!(matches!(codec.decode(&[1, 2, 3]), Err(DocumentError::Decode(_))));

        // Valid header, element type 0x10 (int32) truncated.
        let bad = [10u8, 0, 0, 0, 0x10, b'a', 0, 1, 0, 0];
        assert!(matches!(codec.decode(&bad), Err(DocumentError::Decode(_))));
    }

    #[test]
    fn test_nul_key_rejected() {
        let doc = Document::from_entries(vec![Entry::new("a\0b", 1i32)]);
        assert!(matches!(
            Codec::default().encode(&doc),
            Err(DocumentError::Encode(_))
        ));
    }

    #[test]
    fn test_nesting_limit() {
        let codec = Codec::new(CodecConfig {
            max_nesting_depth: 3,
            ..CodecConfig::default()
        });
        assert!(codec.encode(&nested(3)).is_ok());
        assert!(matches!(
            codec.encode(&nested(4)),
            Err(DocumentError::NestingTooDeep { depth: 4, max: 3 })
        ));

        let deep_bytes = Codec::default().encode(&nested(4)).unwrap();
        assert!(matches!(
            codec.decode(&deep_bytes),
            Err(DocumentError::NestingTooDeep { .. })
        ));
    }

    #[test]
    fn test_encode_reports_full_depth() {
        let codec = Codec::new(CodecConfig {
            max_nesting_depth: 3,
            ..CodecConfig::default()
        });
        let doc = nested(6);
        assert_eq!(doc.nesting_depth(), 6);
        assert!(matches!(
            codec.encode(&doc),
            Err(DocumentError::NestingTooDeep { depth: 6, max: 3 })
        ));
    }

    #[test]
    fn test_size_limit() {
        let codec = Codec::new(CodecConfig {
            max_document_size: 16,
            ..CodecConfig::default()
        });
        let doc = Document::from_entries(vec![Entry::new("name", "a long enough string")]);
        assert!(matches!(
            codec.encode(&doc),
            Err(DocumentError::DocumentTooLarge { max: 16, .. })
        ));

        let bytes = Codec::default().encode(&doc).unwrap();
        assert!(matches!(
            codec.decode(&bytes),
            Err(DocumentError::DocumentTooLarge { .. })
        ));
    }

    #[test]
    fn test_empty_document() {
        let codec = Codec::default();
        let bytes = codec.encode(&Document::new()).unwrap();
        assert_eq!(bytes, vec![5, 0, 0, 0, 0]);
        assert!(codec.decode(&bytes).unwrap().is_empty());
    }
}
