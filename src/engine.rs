//! # Layout Engine Facade
//!
//! `LayoutEngine` ties the components into the pipeline the CLI drives:
//!
//! ```text
//! schema JSON ──compile──> LayoutMap ──┬── save/load descriptor
//!                                      ├── map backing file + access
//!                                      └── emit layout_ffi.hpp / .cpp
//! ```
//!
//! The engine owns the compiled map and (once allocated) the mapped backing
//! buffer. It adds no semantics of its own: each method delegates to the
//! component module and exists so callers get the whole pipeline behind one
//! handle.

use eyre::{bail, ensure, Result, WrapErr};
use std::path::Path;

use crate::descriptor::DescriptorCodec;
use crate::ffi;
use crate::layout::{compile_layout, LayoutMap};
use crate::parsing::json::{parse_document, JsonValue};
use crate::region::accessor;
use crate::region::{MappedBuffer, RegionAccessor};

#[derive(Debug, Default)]
pub struct LayoutEngine {
    map: LayoutMap,
    buffer: Option<MappedBuffer>,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a schema file of shape `{ "layout": { ... } }` and compiles it.
    pub fn load_layout_json<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read schema file '{}'", path.display()))?;
        let document = parse_document(&text)
            .wrap_err_with(|| format!("failed to parse schema file '{}'", path.display()))?;

        let layout = document.get("layout").ok_or_else(|| {
            eyre::eyre!(
                "invalid layout schema: '{}' has no top-level 'layout' key",
                path.display()
            )
        })?;
        self.build_layout(layout)
    }

    /// Compiles a schema value that has already been parsed.
    pub fn build_layout(&mut self, layout_def: &JsonValue) -> Result<()> {
        self.map = compile_layout(layout_def)?;
        Ok(())
    }

    pub fn layout(&self) -> &LayoutMap {
        &self.map
    }

    pub fn save_descriptor<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        DescriptorCodec::save(&self.map, path)
    }

    pub fn load_descriptor<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.map = DescriptorCodec::load(path)?;
        Ok(())
    }

    /// Creates (or reopens) the backing file sized to the compiled layout
    /// and maps it read-write shared.
    pub fn allocate_memory_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        ensure!(
            self.map.total_size > 0,
            "cannot allocate a backing buffer for an empty layout"
        );
        self.buffer = Some(MappedBuffer::create(path, self.map.total_size)?);
        Ok(())
    }

    pub fn mapped_size(&self) -> usize {
        self.map.total_size
    }

    /// An accessor over the mapped buffer. Fails until
    /// [`allocate_memory_from_file`](Self::allocate_memory_from_file) has
    /// run.
    pub fn accessor(&mut self) -> Result<RegionAccessor<'_>> {
        let Some(buffer) = self.buffer.as_mut() else {
            bail!("no backing buffer mapped; call allocate_memory_from_file first");
        };
        RegionAccessor::new(&self.map, buffer.as_mut_slice())
    }

    pub fn insert(&mut self, field_name: &str, item: &[u8]) -> Result<()> {
        self.accessor()?.insert(field_name, item)
    }

    pub fn pop(&mut self, field_name: &str, index: usize) -> Result<()> {
        self.accessor()?.pop(field_name, index)
    }

    pub fn get(&self, field_name: &str, index: usize) -> Result<Option<&[u8]>> {
        let Some(buffer) = self.buffer.as_ref() else {
            bail!("no backing buffer mapped; call allocate_memory_from_file first");
        };
        let region = buffer.as_slice();
        match accessor::resolve_span(&self.map, region, field_name, index)? {
            Some((start, len)) => Ok(Some(&region[start..start + len])),
            None => Ok(None),
        }
    }

    pub fn generate_ffi_header<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        ffi::header::generate_header(&self.map, path)
    }

    pub fn generate_ffi_source<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        ffi::source::generate_source(&self.map, path)
    }

    pub fn validate_and_format<P: AsRef<Path>>(&self, header_path: P, source_path: P) -> Result<()> {
        ffi::validate_and_format(header_path, source_path)
    }
}
