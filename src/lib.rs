//! # memlay - Declarative Memory-Layout Compiler
//!
//! memlay compiles a high-level JSON schema describing a record (scalar
//! fields, fixed-capacity strings, nested objects, fixed-capacity arrays of
//! objects) into a deterministic binary memory layout, and puts that layout
//! to work three ways:
//!
//! - **Persist**: the compiled layout serializes to a compact, self-describing
//!   binary descriptor and reloads bit-exact.
//! - **Access**: a runtime accessor manipulates a memory-mapped backing file
//!   directly (scalar read/write, string copy, array insert/pop/get with
//!   per-slot occupancy tracking) by looking up field descriptors by name.
//! - **Emit**: a generated C++ header/source pair exposes typed accessors
//!   over the same backing file, with every offset constant derived from the
//!   compiled layout.
//!
//! ## Quick Start
//!
//! ```ignore
//! use memlay::LayoutEngine;
//!
//! let mut engine = LayoutEngine::new();
//! engine.load_layout_json("layout.json")?;
//! engine.allocate_memory_from_file("memory.buf")?;
//! engine.save_descriptor("layout.ram")?;
//! engine.generate_ffi_header("out/layout_ffi.hpp")?;
//! engine.generate_ffi_source("out/layout_ffi.cpp")?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │       CLI Driver (bin/memlay)        │
//! ├─────────────────────────────────────┤
//! │       Engine Facade (LayoutEngine)   │
//! ├─────────────┬───────────┬───────────┤
//! │ FFI Emitter │ Descriptor│  Region   │
//! │ (hpp + cpp) │   Codec   │ Accessor  │
//! ├─────────────┴───────────┴───────────┤
//! │       Layout Compiler (LayoutMap)    │
//! ├─────────────────────────────────────┤
//! │       Schema JSON Parser             │
//! └─────────────────────────────────────┘
//! ```
//!
//! Data flow: schema JSON → layout compiler → `LayoutMap` → descriptor codec
//! (persist/reload), region accessor (live access over the mapped buffer),
//! and FFI emitter (two deterministic source files).
//!
//! ## Layout Rules
//!
//! Top-level fields occupy the buffer in schema order. Scalars take their
//! atomic width, strings take `max_length` bytes, objects take the sum of
//! their children. An object array is a 4-byte little-endian count prefix
//! followed by `max_items` fixed-stride slots; each slot starts with a
//! 1-byte occupancy flag (1 = live, 0 = vacant) followed by the packed item
//! fields.
//!
//! ## Module Overview
//!
//! - [`layout`]: type atlas, field descriptors, and the schema compiler
//! - [`parsing`]: order-preserving JSON parsing for schema files
//! - [`descriptor`]: binary persistence of compiled layouts
//! - [`region`]: memory-mapped backing buffer and the runtime accessor
//! - [`ffi`]: C++ declarations/implementations emission and formatting
//! - [`engine`]: the facade sequencing compile → persist → map → emit

pub mod descriptor;
pub mod engine;
pub mod ffi;
pub mod layout;
pub mod parsing;
pub mod region;

pub use engine::LayoutEngine;
pub use layout::{compile_layout, FieldDescriptor, FieldSet, FieldType, LayoutMap, TypeTag};
pub use region::{MappedBuffer, RegionAccessor};
