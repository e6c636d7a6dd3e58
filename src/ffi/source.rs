//! # Implementations Emitter
//!
//! Emits `layout_ffi.cpp`: the process-global base pointer, the
//! `init_layout_buffer` body, and every accessor body. Function bodies are
//! derived directly from the `LayoutMap`; the declarations file lists
//! exactly the same surface, so the two stay in lockstep by construction.
//!
//! The file is self-contained: it re-declares the offset constants and the
//! array item structs rather than including the header (which would
//! redefine the same `constexpr` objects in one translation unit).
//!
//! Address computation in every body is a single expression:
//!
//! ```text
//! scalars/strings/objects  base_ptr + OFFSET_<field>
//! array children           base_ptr + OFFSET_<f>_base + index * STRIDE_<f> + OFFSET_<f>_<child>
//! occupancy byte           base_ptr + OFFSET_<f>_base + index * STRIDE_<f>
//! ```

use eyre::{Result, WrapErr};
use std::path::Path;

use crate::ffi::c_scalar_type;
use crate::ffi::header::{emit_mirror_structs, emit_offset_constants};
use crate::ffi::writer::SourceWriter;
use crate::layout::map::{FieldDescriptor, LayoutMap};
use crate::layout::types::FieldType;

/// Renders the implementations file for a compiled layout.
pub fn emit_implementations(map: &LayoutMap) -> String {
    let mut w = SourceWriter::new();

    w.line("// Generated alongside layout_ffi.hpp. This file is self-contained");
    w.line("// and compiles without the header on the include path.");
    w.blank();
    w.line("#include <cstddef>");
    w.line("#include <cstdint>");
    w.line("#include <cstring>");
    w.line("#include <fcntl.h>");
    w.line("#include <stdexcept>");
    w.line("#include <sys/mman.h>");
    w.line("#include <unistd.h>");
    w.blank();
    w.line("static void* base_ptr = nullptr;");
    w.blank();

    emit_offset_constants(&mut w, map);
    emit_mirror_structs(&mut w, map, false);

    w.line("extern \"C\" {");
    w.blank();

    emit_init_body(&mut w);

    for field in &map.fields {
        emit_field_bodies(&mut w, field);
    }

    w.line("} // extern \"C\"");

    w.finish()
}

/// Emits the implementations file to `path`.
pub fn generate_source<P: AsRef<Path>>(map: &LayoutMap, path: P) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, emit_implementations(map))
        .wrap_err_with(|| format!("failed to write FFI source '{}'", path.display()))
}

fn emit_init_body(w: &mut SourceWriter) {
    w.line("void init_layout_buffer(const char* path) {");
    w.line("    int fd = open(path, O_RDWR | O_CREAT, 0600);");
    w.line("    if (fd < 0)");
    w.line("        throw std::runtime_error(\"open(backing file) failed\");");
    w.line("    if (ftruncate(fd, OFFSET_TOTAL_SIZE) < 0) {");
    w.line("        close(fd);");
    w.line("        throw std::runtime_error(\"ftruncate(backing file) failed\");");
    w.line("    }");
    w.line("    void* mapped = mmap(nullptr, OFFSET_TOTAL_SIZE, PROT_READ | PROT_WRITE,");
    w.line("                        MAP_SHARED, fd, 0);");
    w.line("    if (mapped == MAP_FAILED) {");
    w.line("        close(fd);");
    w.line("        throw std::runtime_error(\"mmap(backing file) failed\");");
    w.line("    }");
    w.line("    close(fd);");
    w.line("    base_ptr = mapped;");
    w.line("}");
    w.blank();
}

fn emit_field_bodies(w: &mut SourceWriter, field: &FieldDescriptor) {
    match &field.field_type {
        FieldType::String { .. } => emit_string_bodies(w, field),
        FieldType::Object { children } => {
            for child in children {
                let c_type = c_scalar_type(&child.field_type)
                    .expect("object children are scalars");
                let full = format!("{}_{}", field.name, child.name);
                emit_direct_accessor(w, &full, c_type);
            }
        }
        FieldType::Array { children, .. } => emit_array_bodies(w, field, children.fields()),
        scalar => {
            let c_type = c_scalar_type(scalar).expect("remaining kinds are scalars");
            emit_direct_accessor(w, &field.name, c_type);
        }
    }
}

/// Getter/setter pair addressing `base_ptr + OFFSET_<name>` directly:
/// top-level scalars and object children.
fn emit_direct_accessor(w: &mut SourceWriter, name: &str, c_type: &str) {
    w.line(&format!("{} get_{}() {{", c_type, name));
    w.line(&format!(
        "    return *reinterpret_cast<{}*>((char*)base_ptr + OFFSET_{});",
        c_type, name
    ));
    w.line("}");
    w.blank();

    w.line(&format!("void set_{}({} value) {{", name, c_type));
    w.line(&format!(
        "    *reinterpret_cast<{}*>((char*)base_ptr + OFFSET_{}) = value;",
        c_type, name
    ));
    w.line("}");
    w.blank();
}

fn emit_string_bodies(w: &mut SourceWriter, field: &FieldDescriptor) {
    w.line(&format!("const char* get_{}() {{", field.name));
    w.line(&format!(
        "    return reinterpret_cast<const char*>((char*)base_ptr + OFFSET_{});",
        field.name
    ));
    w.line("}");
    w.blank();

    w.line(&format!("void set_{}(const char* value) {{", field.name));
    w.line(&format!(
        "    std::strncpy((char*)base_ptr + OFFSET_{}, value, {}_MAX_LEN);",
        field.name, field.name
    ));
    w.line("}");
    w.blank();
}

fn emit_array_bodies(w: &mut SourceWriter, field: &FieldDescriptor, children: &[FieldDescriptor]) {
    let name = &field.name;

    w.line(&format!("std::size_t get_{}_count() {{", name));
    w.line(&format!(
        "    return *reinterpret_cast<uint32_t*>((char*)base_ptr + OFFSET_{}_count);",
        name
    ));
    w.line("}");
    w.blank();

    w.line(&format!("void set_{}_count(std::size_t count) {{", name));
    w.line(&format!(
        "    *reinterpret_cast<uint32_t*>((char*)base_ptr + OFFSET_{}_count) =",
        name
    ));
    w.line("        static_cast<uint32_t>(count);");
    w.line("}");
    w.blank();

    for child in children {
        let c_type = c_scalar_type(&child.field_type).expect("array children are scalars");
        let slot = format!(
            "(char*)base_ptr + OFFSET_{}_base + index * STRIDE_{} + OFFSET_{}_{}",
            name, name, name, child.name
        );

        w.line(&format!(
            "{} get_{}_{}(std::size_t index) {{",
            c_type, name, child.name
        ));
        w.line(&format!(
            "    return *reinterpret_cast<{}*>({});",
            c_type, slot
        ));
        w.line("}");
        w.blank();

        w.line(&format!(
            "void set_{}_{}(std::size_t index, {} value) {{",
            name, child.name, c_type
        ));
        w.line(&format!(
            "    *reinterpret_cast<{}*>({}) = value;",
            c_type, slot
        ));
        w.line("}");
        w.blank();
    }

    w.line(&format!("void pop_{}(std::size_t index) {{", name));
    w.line(&format!(
        "    *((char*)base_ptr + OFFSET_{}_base + index * STRIDE_{}) = 0;",
        name, name
    ));
    w.line("}");
    w.blank();

    // The by-value fetch reads each member through its offset constant:
    // the packed slot layout and the C struct layout differ whenever the
    // compiler inserts padding, so a raw byte copy is not an option.
    w.line(&format!(
        "struct {} get_{}_item(std::size_t index) {{",
        name, name
    ));
    w.line(&format!(
        "    const char* item = (const char*)base_ptr + OFFSET_{}_base + index * STRIDE_{};",
        name, name
    ));
    w.line(&format!("    struct {} out;", name));
    for child in children {
        let c_type = c_scalar_type(&child.field_type).expect("array children are scalars");
        w.line(&format!(
            "    out.{} = *reinterpret_cast<const {}*>(item + OFFSET_{}_{});",
            child.name, c_type, name, child.name
        ));
    }
    w.line("    return out;");
    w.line("}");
    w.blank();

    w.line(&format!(
        "void get_{}_items(std::size_t start, std::size_t count, struct {}* out_buffer) {{",
        name, name
    ));
    w.line("    for (std::size_t i = 0; i < count; ++i) {");
    w.line(&format!("        out_buffer[i] = get_{}_item(start + i);", name));
    w.line("    }");
    w.line("}");
    w.blank();
}
