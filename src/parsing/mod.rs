//! # Schema Parsing
//!
//! Parsing support for layout schema files. The layout compiler treats JSON
//! strictly as a value supplier: this module turns schema text into a
//! `JsonValue` tree and the compiler consumes the tree.
//!
//! Field order is significant in a layout schema, so objects parse into an
//! ordered `Vec<(String, JsonValue)>` rather than a map: insertion order is
//! exactly file order, which is what drives offset assignment.

pub mod json;

pub use json::{parse_document, JsonValue};
