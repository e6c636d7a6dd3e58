//! # Compiled Layout Descriptors
//!
//! This module defines the compiled representation of a layout:
//!
//! - `FieldDescriptor`: one named field with its absolute (top level) or
//!   relative (child) byte offset and total span
//! - `FieldSet`: an ordered sequence of descriptors plus a name→index map
//! - `LayoutMap`: the top-level field set and the root buffer length
//!
//! ## Ordering and Lookup
//!
//! Offsets are fully determined by schema order, so `FieldSet` preserves
//! insertion order in a `Vec` and keeps a separate name→index map for O(1)
//! lookup. The map is derived state: the descriptor codec never serializes
//! it and rebuilds it from field order on load.

use eyre::{ensure, Result};
use hashbrown::HashMap;

use crate::layout::types::FieldType;

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    /// Absolute byte offset for top-level fields; slot-relative for array
    /// children (occupancy byte excluded) and object-relative for object
    /// children.
    pub offset: usize,
    /// Total byte span inside the enclosing buffer. For strings this equals
    /// `max_length`; for arrays it covers the slots but not the 4-byte
    /// count prefix.
    pub size: usize,
    pub field_type: FieldType,
}

/// Ordered fields plus a rebuilt name→index map.
#[derive(Debug, Clone, Default)]
pub struct FieldSet {
    fields: Vec<FieldDescriptor>,
    index: HashMap<String, usize>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a descriptor, rejecting duplicate names within this scope.
    pub fn push(&mut self, field: FieldDescriptor) -> Result<()> {
        ensure!(
            !self.index.contains_key(&field.name),
            "invalid layout schema: duplicate field name '{}'",
            field.name
        );
        self.index.insert(field.name.clone(), self.fields.len());
        self.fields.push(field);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldDescriptor> {
        self.fields.iter()
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }
}

impl PartialEq for FieldSet {
    // The index is derived from field order; comparing the fields is enough.
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl<'a> IntoIterator for &'a FieldSet {
    type Item = &'a FieldDescriptor;
    type IntoIter = std::slice::Iter<'a, FieldDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// The compiled, ordered descriptor of all top-level fields.
///
/// Read-only after compilation or decoding. Neither the compiler nor the
/// accessor owns the backing storage; `total_size` is the byte length the
/// caller must provide.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutMap {
    pub total_size: usize,
    pub fields: FieldSet,
}

impl LayoutMap {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }
}
