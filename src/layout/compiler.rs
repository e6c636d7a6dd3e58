//! # Layout Compiler
//!
//! Reduces a parsed schema value to a flat offset table (`LayoutMap`).
//!
//! ## Layout Algorithm
//!
//! The compiler walks the top-level schema in insertion order with a running
//! byte cursor:
//!
//! - **Scalars** consume their atomic width, **strings** consume
//!   `max_length` bytes (default 256).
//! - **Objects** walk their children over an inner cursor starting at 0;
//!   the object consumes the sum of its children.
//! - **Object arrays** first reserve a 4-byte little-endian count prefix at
//!   the field's offset, then lay out `max_items` slots of fixed stride.
//!   Each slot is one occupancy byte followed by the packed children; child
//!   offsets are intra-item and exclude the occupancy byte (the accessor
//!   and the emitter add it back at access time).
//!
//! Two compilations of the same schema produce byte-identical layouts: the
//! cursor is the only state, and schema order drives it.
//!
//! ## Schema Shape
//!
//! ```json
//! {
//!   "id":      { "type": "int32" },
//!   "name":    { "type": "string", "max_length": 16 },
//!   "pos":     { "type": "object", "schema": { "x": "float32", "y": "float32" } },
//!   "orders":  { "type": "object[]", "max_items": 4,
//!                "schema": { "price": "float64", "amount": "float32", "side": "int32" } }
//! }
//! ```
//!
//! Object and object-array children are limited to `int32`, `float32` and
//! `float64`. Field names become C identifiers in the emitted surface, so
//! they must match `[A-Za-z_][A-Za-z0-9_]*`.

use eyre::{bail, ensure, Result};

use crate::layout::map::{FieldDescriptor, FieldSet, LayoutMap};
use crate::layout::types::FieldType;
use crate::parsing::json::JsonValue;

const DEFAULT_STRING_CAPACITY: usize = 256;
const ARRAY_COUNT_PREFIX: usize = 4;

/// Compiles the `"layout"` value of a schema document into a `LayoutMap`.
pub fn compile_layout(layout_def: &JsonValue) -> Result<LayoutMap> {
    let entries = match layout_def {
        JsonValue::Object(entries) => entries,
        other => bail!(
            "invalid layout schema: expected an object of field definitions, got {}",
            other.kind_name()
        ),
    };

    let mut fields = FieldSet::new();
    let mut off = 0usize;

    for (name, def) in entries {
        ensure_identifier(name)?;
        let field = compile_field(name, def, &mut off)?;
        fields.push(field)?;
    }

    Ok(LayoutMap {
        total_size: off,
        fields,
    })
}

fn compile_field(name: &str, def: &JsonValue, off: &mut usize) -> Result<FieldDescriptor> {
    let type_str = def
        .get("type")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| {
            eyre::eyre!(
                "invalid layout schema: field '{}' is missing a 'type' string",
                name
            )
        })?;

    match type_str {
        "int32" | "int64" | "float32" | "float64" => {
            let field_type = scalar_type(type_str).expect("scalar arm matches scalar_type");
            let size = field_type
                .tag()
                .scalar_width()
                .expect("scalar kinds have a width");
            let offset = *off;
            *off += size;
            Ok(FieldDescriptor {
                name: name.to_string(),
                offset,
                size,
                field_type,
            })
        }
        "string" => {
            let max_length = match def.get("max_length") {
                Some(v) => positive_usize(v).ok_or_else(|| {
                    eyre::eyre!(
                        "invalid layout schema: string '{}' has a non-positive-integer max_length",
                        name
                    )
                })?,
                None => DEFAULT_STRING_CAPACITY,
            };
            let offset = *off;
            *off += max_length;
            Ok(FieldDescriptor {
                name: name.to_string(),
                offset,
                size: max_length,
                field_type: FieldType::String { max_length },
            })
        }
        "object" => {
            let children = compile_children(name, def)?;
            let size = children.iter().map(|c| c.size).sum();
            let offset = *off;
            *off += size;
            Ok(FieldDescriptor {
                name: name.to_string(),
                offset,
                size,
                field_type: FieldType::Object { children },
            })
        }
        "object[]" => {
            let max_items = def
                .get("max_items")
                .and_then(positive_usize)
                .ok_or_else(|| {
                    eyre::eyre!(
                        "invalid layout schema: array '{}' requires a positive integer max_items",
                        name
                    )
                })?;

            // The count prefix sits at the field's offset; slots follow it.
            let count_offset = *off;
            *off += ARRAY_COUNT_PREFIX;

            let children = compile_children(name, def)?;
            let payload: usize = children.iter().map(|c| c.size).sum();
            let item_stride = payload + 1;
            let size = item_stride * max_items;
            *off += size;

            Ok(FieldDescriptor {
                name: name.to_string(),
                offset: count_offset,
                size,
                field_type: FieldType::Array {
                    children,
                    count_offset,
                    item_stride,
                    max_items,
                    has_used_flag: true,
                },
            })
        }
        other => bail!(
            "invalid layout schema: field '{}' has unsupported type '{}'",
            name,
            other
        ),
    }
}

/// Walks a `"schema"` sub-mapping over an inner cursor. Child offsets are
/// relative to the enclosing object or array item.
fn compile_children(parent: &str, def: &JsonValue) -> Result<FieldSet> {
    let schema = def.get("schema").ok_or_else(|| {
        eyre::eyre!(
            "invalid layout schema: field '{}' requires a 'schema' sub-mapping",
            parent
        )
    })?;

    let entries = match schema {
        JsonValue::Object(entries) => entries,
        other => bail!(
            "invalid layout schema: '{}' schema must be an object, got {}",
            parent,
            other.kind_name()
        ),
    };

    let mut children = FieldSet::new();
    let mut iff = 0usize;

    for (child_name, child_def) in entries {
        ensure_identifier(child_name)?;
        let type_str = child_def.as_str().ok_or_else(|| {
            eyre::eyre!(
                "invalid layout schema: child '{}.{}' must be a scalar type string",
                parent,
                child_name
            )
        })?;

        let field_type = match type_str {
            "int32" => FieldType::Int32,
            "float32" => FieldType::Float32,
            "float64" => FieldType::Float64,
            other => bail!(
                "invalid layout schema: child '{}.{}' has unsupported type '{}' \
                 (children are limited to int32, float32, float64)",
                parent,
                child_name,
                other
            ),
        };

        let size = field_type
            .tag()
            .scalar_width()
            .expect("child kinds are scalars");
        children.push(FieldDescriptor {
            name: child_name.to_string(),
            offset: iff,
            size,
            field_type,
        })?;
        iff += size;
    }

    Ok(children)
}

fn scalar_type(type_str: &str) -> Option<FieldType> {
    match type_str {
        "int32" => Some(FieldType::Int32),
        "int64" => Some(FieldType::Int64),
        "float32" => Some(FieldType::Float32),
        "float64" => Some(FieldType::Float64),
        _ => None,
    }
}

/// JSON numbers are f64; sizes must be positive integers.
fn positive_usize(value: &JsonValue) -> Option<usize> {
    let n = value.as_f64()?;
    if n >= 1.0 && n.fract() == 0.0 && n <= usize::MAX as f64 {
        Some(n as usize)
    } else {
        None
    }
}

fn ensure_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    ensure!(
        valid,
        "invalid layout schema: field name '{}' is not a valid identifier",
        name
    );
    Ok(())
}
