//! # FFI Emission
//!
//! Emits the C++ accessor surface for a compiled layout: a declarations
//! file (`layout_ffi.hpp`) and an implementations file (`layout_ffi.cpp`)
//! that together form a compilable, C-linkage API over the memory-mapped
//! backing file.
//!
//! ## Determinism
//!
//! Both files are pure functions of the `LayoutMap`: field order drives
//! emission order, offsets come straight from the descriptors, and nothing
//! environmental (timestamps, paths, locale) enters the output. Emitting
//! the same map twice produces byte-identical files.
//!
//! ## Surface Shape
//!
//! The declarations file carries the offset constants, the mirror structs
//! (item structs before the C-linkage block, since the by-value item fetch
//! returns them), and the `extern "C"` prototypes. The implementations file
//! is deliberately self-contained: it re-declares the constants and item
//! structs instead of including the header, defines the process-global
//! `base_ptr`, and provides every function body. Emitted accessors do no
//! index checking; callers observe `get_<field>_count()` before indexing.
//!
//! ## Module Structure
//!
//! - `writer`: line-oriented source writer
//! - `header`: declarations-file emitter
//! - `source`: implementations-file emitter
//! - `format`: post-emission validate-and-format hook

pub mod format;
pub mod header;
pub mod source;
pub mod writer;

#[cfg(test)]
mod tests;

pub use format::validate_and_format;
pub use header::emit_declarations;
pub use source::emit_implementations;

use crate::layout::types::FieldType;

/// C type spelling for a scalar field kind.
pub(crate) fn c_scalar_type(field_type: &FieldType) -> Option<&'static str> {
    match field_type {
        FieldType::Int32 => Some("int"),
        FieldType::Int64 => Some("long long"),
        FieldType::Float32 => Some("float"),
        FieldType::Float64 => Some("double"),
        _ => None,
    }
}
