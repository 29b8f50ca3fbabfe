//! Filter document builder
//!
//! Covers every MQL query operator category:
//! - Comparison: `$gt`, `$gte`, `$lt`, `$lte`, `$ne`, `$in`, `$nin`
//! - Logical: `$and`, `$or`, `$not`, `$nor`
//! - Array: `$all`, `$elemMatch`, `$size`
//! - Element: `$exists`, `$type`
//! - Evaluation: `$mod`, `$regex`, `$text`, `$where`
//! - Bitwise: `$bitsAllClear`, `$bitsAllSet`, `$bitsAnyClear`, `$bitsAnySet`
//! - Geospatial: `$geoWithin`, `$geoIntersects`, `$near`
//!
//! Nothing is validated. Two predicates on the same field produce two
//! top-level entries with the same key; both reach the wire, but the
//! key-map view keeps only the last one.

use bson::Bson;

use super::chain::EntryChain;
use super::ops;
use crate::document::{Document, Entry, Value};

/// Builder for MQL filter documents
#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    entries: EntryChain,
}

impl FilterBuilder {
    /// Create a builder with no predicates
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

    /// Finalize into a document, entries in call order
    pub fn doc(&self) -> Document {
        Document::from_entries(self.entries.to_vec())
    }

    /// Neutral filter: drops everything accumulated so far and matches all
    /// documents
    pub fn empty(&self) -> Self {
        Self::new()
    }

    fn append(&self, entry: Entry) -> Self {
        Self {
            entries: self.entries.push(entry),
        }
    }

    fn field_op(&self, field: impl Into<String>, op: &str, value: impl Into<Value>) -> Self {
        self.append(Entry::new(field, operator(op, value)))
    }

    fn logical(&self, op: &str, filters: impl IntoIterator<Item = Document>) -> Self {
        let clauses: Vec<Value> = filters.into_iter().map(Value::Document).collect();
        self.append(Entry::new(op, Value::Array(clauses)))
    }

    // Comparison

    /// `{ field: value }`
    pub fn eq(&self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.append(Entry::new(field, value))
    }

    /// `{ field: { $gt: value } }`
    pub fn gt(&self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.field_op(field, ops::GT, value)
    }

    /// `{ field: { $gte: value } }`
    pub fn gte(&self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.field_op(field, ops::GTE, value)
    }

    /// `{ field: { $lt: value } }`
    pub fn lt(&self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.field_op(field, ops::LT, value)
    }

    /// `{ field: { $lte: value } }`
    pub fn lte(&self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.field_op(field, ops::LTE, value)
    }

    /// `{ field: { $ne: value } }`
    pub fn ne(&self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.field_op(field, ops::NE, value)
    }

    /// `{ field: { $in: [values] } }`
    pub fn in_values<V: Into<Value>>(
        &self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.field_op(field, ops::IN, array(values))
    }

    /// `{ field: { $nin: [values] } }`
    pub fn nin<V: Into<Value>>(
        &self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.field_op(field, ops::NIN, array(values))
    }

    // Logical

    /// `{ $and: [filter, ...] }`
    pub fn and(&self, filters: impl IntoIterator<Item = Document>) -> Self {
        self.logical(ops::AND, filters)
    }

    /// `{ $or: [filter, ...] }`
    pub fn or(&self, filters: impl IntoIterator<Item = Document>) -> Self {
        self.logical(ops::OR, filters)
    }

    /// `{ $nor: [filter, ...] }`
    pub fn nor(&self, filters: impl IntoIterator<Item = Document>) -> Self {
        self.logical(ops::NOR, filters)
    }

    /// `{ $not: filter }`
    pub fn not(&self, filter: Document) -> Self {
        self.append(Entry::new(ops::NOT, filter))
    }

    // Array

    /// `{ field: { $all: [values] } }`
    pub fn all<V: Into<Value>>(
        &self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.field_op(field, ops::ALL, array(values))
    }

    /// `{ field: { $elemMatch: filter } }`
    pub fn elem_match(&self, field: impl Into<String>, filter: impl Into<Document>) -> Self {
        self.field_op(field, ops::ELEM_MATCH, Value::Document(filter.into()))
    }

    /// `{ field: { $size: size } }`
    pub fn size(&self, field: impl Into<String>, size: i64) -> Self {
        self.field_op(field, ops::SIZE, size)
    }

    // Element

    /// `{ field: { $exists: true } }`
    pub fn exists(&self, field: impl Into<String>) -> Self {
        self.field_op(field, ops::EXISTS, true)
    }

    /// `{ field: { $type: alias } }` or `{ field: { $type: [aliases] } }`
    pub fn type_of(&self, field: impl Into<String>, types: impl Into<TypeSpec>) -> Self {
        let value = match types.into() {
            TypeSpec::Alias(alias) => Value::from(alias),
            TypeSpec::Aliases(mut aliases) if aliases.len() == 1 => Value::from(aliases.remove(0)),
            TypeSpec::Aliases(aliases) => Value::from(aliases),
        };
        self.field_op(field, ops::TYPE, value)
    }

    // Evaluation

    /// `{ field: { $mod: [divisor, remainder] } }`
    pub fn modulo(&self, field: impl Into<String>, divisor: i64, remainder: i64) -> Self {
        self.field_op(field, ops::MOD, [divisor, remainder])
    }

    /// `{ field: { $regex: pattern, $options: options } }`
    ///
    /// `$options` is left out when `options` is empty.
    pub fn regex(
        &self,
        field: impl Into<String>,
        pattern: impl Into<String>,
        options: impl Into<String>,
    ) -> Self {
        let pattern: String = pattern.into();
        let options: String = options.into();
        let mut entries = vec![Entry::new(ops::REGEX, pattern)];
        if !options.is_empty() {
            entries.push(Entry::new(ops::OPTIONS, options));
        }
        self.append(Entry::new(field, Document::from_entries(entries)))
    }

    /// `{ $text: { $search: search } }`
    pub fn text(&self, search: impl Into<String>) -> Self {
        self.text_with_options(search, &TextSearchOptions::default())
    }

    /// `{ $text: { $search: search, ...options } }`
    pub fn text_with_options(
        &self,
        search: impl Into<String>,
        options: &TextSearchOptions,
    ) -> Self {
        let search: String = search.into();
        let mut entries = vec![Entry::new(ops::SEARCH, search)];
        if let Some(language) = &options.language {
            entries.push(Entry::new(ops::LANGUAGE, language.as_str()));
        }
        if let Some(case_sensitive) = options.case_sensitive {
            entries.push(Entry::new(ops::CASE_SENSITIVE, case_sensitive));
        }
        if let Some(diacritic_sensitive) = options.diacritic_sensitive {
            entries.push(Entry::new(ops::DIACRITIC_SENSITIVE, diacritic_sensitive));
        }
        self.append(Entry::new(ops::TEXT, Document::from_entries(entries)))
    }

    /// `{ $where: <javascript> }`
    pub fn where_js(&self, code: impl Into<String>) -> Self {
        self.append(Entry::new(ops::WHERE, Bson::JavaScriptCode(code.into())))
    }

    // Bitwise

    /// `{ field: { $bitsAllClear: mask | [positions] } }`
    pub fn bits_all_clear(&self, field: impl Into<String>, bits: impl Into<BitTest>) -> Self {
        self.field_op(field, ops::BITS_ALL_CLEAR, bits.into())
    }

    /// `{ field: { $bitsAllSet: mask | [positions] } }`
    pub fn bits_all_set(&self, field: impl Into<String>, bits: impl Into<BitTest>) -> Self {
        self.field_op(field, ops::BITS_ALL_SET, bits.into())
    }

    /// `{ field: { $bitsAnyClear: mask | [positions] } }`
    pub fn bits_any_clear(&self, field: impl Into<String>, bits: impl Into<BitTest>) -> Self {
        self.field_op(field, ops::BITS_ANY_CLEAR, bits.into())
    }

    /// `{ field: { $bitsAnySet: mask | [positions] } }`
    pub fn bits_any_set(&self, field: impl Into<String>, bits: impl Into<BitTest>) -> Self {
        self.field_op(field, ops::BITS_ANY_SET, bits.into())
    }

    // Geospatial

    /// `{ field: { $geoWithin: shape } }`
    pub fn geo_within(&self, field: impl Into<String>, shape: impl Into<Document>) -> Self {
        self.field_op(field, ops::GEO_WITHIN, Value::Document(shape.into()))
    }

    /// `{ field: { $geoWithin: { $box: [lower_left, upper_right] } } }`
    pub fn geo_within_box(
        &self,
        field: impl Into<String>,
        lower_left: [f64; 2],
        upper_right: [f64; 2],
    ) -> Self {
        self.field_op(
            field,
            ops::GEO_WITHIN,
            operator(ops::BOX, [lower_left, upper_right]),
        )
    }

    /// `{ field: { $geoWithin: { $polygon: [points] } } }`
    pub fn geo_within_polygon(
        &self,
        field: impl Into<String>,
        points: impl IntoIterator<Item = [f64; 2]>,
    ) -> Self {
        self.field_op(field, ops::GEO_WITHIN, operator(ops::POLYGON, array(points)))
    }

    /// `{ field: { $geoWithin: { $center: [center, radius] } } }`
    pub fn geo_within_center(&self, field: impl Into<String>, center: [f64; 2], radius: f64) -> Self {
        self.field_op(field, ops::GEO_WITHIN, circle(ops::CENTER, center, radius))
    }

    /// `{ field: { $geoWithin: { $centerSphere: [center, radius] } } }`
    ///
    /// The radius is in radians.
    pub fn geo_within_center_sphere(
        &self,
        field: impl Into<String>,
        center: [f64; 2],
        radius: f64,
    ) -> Self {
        self.field_op(field, ops::GEO_WITHIN, circle(ops::CENTER_SPHERE, center, radius))
    }

    /// `{ field: { $geoIntersects: geometry } }`
    pub fn geo_intersects(&self, field: impl Into<String>, geometry: impl Into<Document>) -> Self {
        self.field_op(field, ops::GEO_INTERSECTS, Value::Document(geometry.into()))
    }

    /// `{ field: { $near: point } }`
    pub fn near(&self, field: impl Into<String>, point: impl Into<Document>) -> Self {
        self.field_op(field, ops::NEAR, Value::Document(point.into()))
    }
}

/// Optional `$text` parameters; unset fields are not emitted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextSearchOptions {
    /// `$language`: stop words, stemmer and tokenizer language
    pub language: Option<String>,
    /// `$caseSensitive`: disable case folding
    pub case_sensitive: Option<bool>,
    /// `$diacriticSensitive`: keep diacritic marks significant
    pub diacritic_sensitive: Option<bool>,
}

impl TextSearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search language
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Set case sensitivity
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = Some(case_sensitive);
        self
    }

    /// Set diacritic sensitivity
    pub fn diacritic_sensitive(mut self, diacritic_sensitive: bool) -> Self {
        self.diacritic_sensitive = Some(diacritic_sensitive);
        self
    }
}

/// Argument of `$type`
///
/// A single alias, or a list holding exactly one, is emitted as a string.
/// Longer lists are emitted as an array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSpec {
    /// One BSON type alias, e.g. `"string"`
    Alias(String),
    /// Any of several aliases
    Aliases(Vec<String>),
}

impl From<&str> for TypeSpec {
    fn from(alias: &str) -> Self {
        TypeSpec::Alias(alias.to_string())
    }
}

impl From<String> for TypeSpec {
    fn from(alias: String) -> Self {
        TypeSpec::Alias(alias)
    }
}

impl<S: Into<String>> From<Vec<S>> for TypeSpec {
    fn from(aliases: Vec<S>) -> Self {
        TypeSpec::Aliases(aliases.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for TypeSpec {
    fn from(aliases: [S; N]) -> Self {
        TypeSpec::Aliases(aliases.into_iter().map(Into::into).collect())
    }
}

impl From<&[&str]> for TypeSpec {
    fn from(aliases: &[&str]) -> Self {
        TypeSpec::Aliases(aliases.iter().map(|s| s.to_string()).collect())
    }
}

/// Argument of the bitwise operators: a numeric mask or bit positions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitTest {
    Mask(i64),
    Positions(Vec<i64>),
}

impl From<i64> for BitTest {
    fn from(mask: i64) -> Self {
        BitTest::Mask(mask)
    }
}

impl From<i32> for BitTest {
    fn from(mask: i32) -> Self {
        BitTest::Mask(i64::from(mask))
    }
}

impl From<Vec<i64>> for BitTest {
    fn from(positions: Vec<i64>) -> Self {
        BitTest::Positions(positions)
    }
}

impl From<&[i64]> for BitTest {
    fn from(positions: &[i64]) -> Self {
        BitTest::Positions(positions.to_vec())
    }
}

impl<const N: usize> From<[i64; N]> for BitTest {
    fn from(positions: [i64; N]) -> Self {
        BitTest::Positions(positions.to_vec())
    }
}

impl From<BitTest> for Value {
    fn from(bits: BitTest) -> Self {
        match bits {
            BitTest::Mask(mask) => Value::from(mask),
            BitTest::Positions(positions) => Value::from(positions),
        }
    }
}

/// Single-entry `{ op: value }` document
fn operator(op: &str, value: impl Into<Value>) -> Document {
    Document::from_entries(vec![Entry::new(op, value)])
}

fn array<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Value {
    Value::Array(values.into_iter().map(Into::into).collect())
}

fn circle(op: &str, center: [f64; 2], radius: f64) -> Document {
    operator(op, Value::Array(vec![Value::from(center), Value::from(radius)]))
}
