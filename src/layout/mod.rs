//! # Layout Module
//!
//! The compile-time half of memlay: the closed type atlas, the compiled
//! descriptor structures, and the compiler that reduces a schema value to a
//! flat offset table.
//!
//! ## Compiled Form
//!
//! A `LayoutMap` is an ordered sequence of `FieldDescriptor`s plus the root
//! buffer length. Descriptors carry absolute offsets for top-level fields
//! and relative offsets for children, so every runtime address is a single
//! addition away:
//!
//! ```text
//! scalar/string/object   base + offset
//! object child           base + offset + child.offset
//! array count            base + count_offset            (u32, little-endian)
//! array slot i           base + offset + 4 + i * item_stride
//! array child            slot + 1 + child.offset        (skip occupancy byte)
//! ```
//!
//! ## Determinism
//!
//! Offsets are fully determined by schema order. Building the same schema
//! twice yields equal maps, which the descriptor codec and the FFI emitter
//! both rely on.
//!
//! ## Module Structure
//!
//! - `types`: `TypeTag` codes and the `FieldType` sum type
//! - `map`: `FieldDescriptor`, `FieldSet`, `LayoutMap`
//! - `compiler`: schema value → `LayoutMap`

pub mod compiler;
pub mod map;
pub mod types;


pub use compiler::compile_layout;
pub use map::{FieldDescriptor, FieldSet, LayoutMap};
pub use types::{FieldType, TypeTag};
