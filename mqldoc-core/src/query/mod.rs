//! Query document builders
//!
//! This module provides immutable builders for MQL filter, sort and
//! projection documents. Each builder method returns a new builder; the
//! receiver is left untouched and can be reused as a shared prefix.

mod chain;
pub mod filter;
pub mod projection;
pub mod sort;

pub use filter::{BitTest, FilterBuilder, TextSearchOptions, TypeSpec};
pub use projection::ProjectionBuilder;
pub use sort::{SortBuilder, SortOrder};

/// Operator tokens emitted by the builders
pub mod ops {
    // Comparison
    pub const GT: &str = "$gt";
    pub const GTE: &str = "$gte";
    pub const LT: &str = "$lt";
    pub const LTE: &str = "$lte";
    pub const NE: &str = "$ne";
    pub const IN: &str = "$in";
    pub const NIN: &str = "$nin";

    // Logical
    pub const AND: &str = "$and";
    pub const OR: &str = "$or";
    pub const NOT: &str = "$not";
    pub const NOR: &str = "$nor";

    // Array
    pub const ALL: &str = "$all";
    pub const ELEM_MATCH: &str = "$elemMatch";
    pub const SIZE: &str = "$size";

    // Element
    pub const EXISTS: &str = "$exists";
    pub const TYPE: &str = "$type";

    // Evaluation
    pub const MOD: &str = "$mod";
    pub const REGEX: &str = "$regex";
    pub const OPTIONS: &str = "$options";
    pub const TEXT: &str = "$text";
    pub const SEARCH: &str = "$search";
    pub const LANGUAGE: &str = "$language";
    pub const CASE_SENSITIVE: &str = "$caseSensitive";
    pub const DIACRITIC_SENSITIVE: &str = "$diacriticSensitive";
    pub const WHERE: &str = "$where";

    // Bitwise
    pub const BITS_ALL_CLEAR: &str = "$bitsAllClear";
    pub const BITS_ALL_SET: &str = "$bitsAllSet";
    pub const BITS_ANY_CLEAR: &str = "$bitsAnyClear";
    pub const BITS_ANY_SET: &str = "$bitsAnySet";

    // Geospatial
    pub const GEO_WITHIN: &str = "$geoWithin";
    pub const GEO_INTERSECTS: &str = "$geoIntersects";
    pub const NEAR: &str = "$near";
    pub const BOX: &str = "$box";
    pub const POLYGON: &str = "$polygon";
    pub const CENTER: &str = "$center";
    pub const CENTER_SPHERE: &str = "$centerSphere";

    // Projection
    pub const SLICE: &str = "$slice";
    pub const META: &str = "$meta";
}
