//! # Declarations Emitter
//!
//! Emits `layout_ffi.hpp`: include guard, offset constants, mirror structs,
//! and the `extern "C"` prototypes for every accessor.
//!
//! The constant naming scheme is fixed:
//!
//! ```text
//! OFFSET_TOTAL_SIZE           root buffer length
//! OFFSET_<field>              scalar / string / top-level field offset
//! <field>_MAX_LEN             string capacity
//! OFFSET_<field>_count        array count prefix
//! OFFSET_<field>_base         first slot (= field offset + 4)
//! STRIDE_<field>              slot stride
//! OFFSET_<field>_<child>      array: intra-slot offset (+1 for the
//!                             occupancy byte); object: field offset +
//!                             child offset (absolute)
//! ```

use eyre::{Result, WrapErr};
use std::path::Path;

use crate::ffi::c_scalar_type;
use crate::ffi::writer::SourceWriter;
use crate::layout::map::{FieldDescriptor, LayoutMap};
use crate::layout::types::FieldType;

/// Renders the declarations file for a compiled layout.
pub fn emit_declarations(map: &LayoutMap) -> String {
    let mut w = SourceWriter::new();

    w.line("#pragma once");
    w.blank();
    w.line("#include <cstddef>");
    w.line("#include <cstdint>");
    w.blank();

    emit_offset_constants(&mut w, map);
    emit_mirror_structs(&mut w, map, true);

    w.line("extern \"C\" {");
    w.blank();
    w.line("void init_layout_buffer(const char* path);");
    w.blank();

    for field in &map.fields {
        emit_field_prototypes(&mut w, field);
    }

    w.line("} // extern \"C\"");

    w.finish()
}

/// Emits the declarations file to `path`.
pub fn generate_header<P: AsRef<Path>>(map: &LayoutMap, path: P) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, emit_declarations(map))
        .wrap_err_with(|| format!("failed to write FFI header '{}'", path.display()))
}

/// The offset/stride constant block, shared verbatim between the
/// declarations and implementations files.
pub(crate) fn emit_offset_constants(w: &mut SourceWriter, map: &LayoutMap) {
    w.line(&format!(
        "constexpr std::size_t OFFSET_TOTAL_SIZE = {};",
        map.total_size
    ));
    w.blank();

    for field in &map.fields {
        w.line(&format!("// {}", field.name));
        match &field.field_type {
            FieldType::Array {
                children,
                count_offset,
                item_stride,
                has_used_flag,
                ..
            } => {
                w.line(&format!(
                    "constexpr std::size_t OFFSET_{}_count = {};",
                    field.name, count_offset
                ));
                w.line(&format!(
                    "constexpr std::size_t OFFSET_{}_base = {};",
                    field.name,
                    field.offset + 4
                ));
                w.line(&format!(
                    "constexpr std::size_t STRIDE_{} = {};",
                    field.name, item_stride
                ));
                for child in children {
                    w.line(&format!(
                        "constexpr std::size_t OFFSET_{}_{} = {};",
                        field.name,
                        child.name,
                        child.offset + *has_used_flag as usize
                    ));
                }
            }
            FieldType::Object { children } => {
                for child in children {
                    w.line(&format!(
                        "constexpr std::size_t OFFSET_{}_{} = {};",
                        field.name,
                        child.name,
                        field.offset + child.offset
                    ));
                }
            }
            FieldType::String { max_length } => {
                w.line(&format!(
                    "constexpr std::size_t {}_MAX_LEN = {};",
                    field.name, max_length
                ));
                w.line(&format!(
                    "constexpr std::size_t OFFSET_{} = {};",
                    field.name, field.offset
                ));
            }
            _ => {
                w.line(&format!(
                    "constexpr std::size_t OFFSET_{} = {};",
                    field.name, field.offset
                ));
            }
        }
        w.blank();
    }
}

/// Mirror structs for object and array fields. With `with_root` the
/// `root_layout` inspection struct is appended.
pub(crate) fn emit_mirror_structs(w: &mut SourceWriter, map: &LayoutMap, with_root: bool) {
    for field in &map.fields {
        if let Some(children) = field.field_type.children() {
            w.line(&format!("struct {} {{", field.name));
            for child in children {
                let c_type = c_scalar_type(&child.field_type)
                    .expect("object and array children are scalars");
                w.line(&format!("    {} {};", c_type, child.name));
            }
            w.line("};");
            w.blank();
        }
    }

    if with_root {
        w.line("struct root_layout {");
        for field in &map.fields {
            match &field.field_type {
                FieldType::String { max_length } => {
                    w.line(&format!("    char {}[{}];", field.name, max_length));
                }
                FieldType::Object { .. } => {
                    w.line(&format!("    struct {} {};", field.name, field.name));
                }
                FieldType::Array { max_items, .. } => {
                    w.line(&format!(
                        "    struct {} {}[{}];",
                        field.name, field.name, max_items
                    ));
                }
                scalar => {
                    let c_type = c_scalar_type(scalar).expect("remaining kinds are scalars");
                    w.line(&format!("    {} {};", c_type, field.name));
                }
            }
        }
        w.line("};");
        w.blank();
    }
}

fn emit_field_prototypes(w: &mut SourceWriter, field: &FieldDescriptor) {
    match &field.field_type {
        FieldType::String { .. } => {
            w.line(&format!("const char* get_{}();", field.name));
            w.line(&format!("void set_{}(const char* value);", field.name));
        }
        FieldType::Object { children } => {
            for child in children {
                let c_type = c_scalar_type(&child.field_type)
                    .expect("object children are scalars");
                w.line(&format!("{} get_{}_{}();", c_type, field.name, child.name));
                w.line(&format!(
                    "void set_{}_{}({} value);",
                    field.name, child.name, c_type
                ));
            }
        }
        FieldType::Array { children, .. } => {
            w.line(&format!("std::size_t get_{}_count();", field.name));
            w.line(&format!("void set_{}_count(std::size_t count);", field.name));
            for child in children {
                let c_type =
                    c_scalar_type(&child.field_type).expect("array children are scalars");
                w.line(&format!(
                    "{} get_{}_{}(std::size_t index);",
                    c_type, field.name, child.name
                ));
                w.line(&format!(
                    "void set_{}_{}(std::size_t index, {} value);",
                    field.name, child.name, c_type
                ));
            }
            w.line(&format!("void pop_{}(std::size_t index);", field.name));
            w.line(&format!(
                "struct {} get_{}_item(std::size_t index);",
                field.name, field.name
            ));
            w.line(&format!(
                "void get_{}_items(std::size_t start, std::size_t count, struct {}* out_buffer);",
                field.name, field.name
            ));
        }
        scalar => {
            let c_type = c_scalar_type(scalar).expect("remaining kinds are scalars");
            w.line(&format!("{} get_{}();", c_type, field.name));
            w.line(&format!("void set_{}({} value);", field.name, c_type));
        }
    }
    w.blank();
}
