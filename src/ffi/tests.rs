//! Tests for the FFI emitters

use crate::ffi::{emit_declarations, emit_implementations};
use crate::layout::{compile_layout, LayoutMap};
use crate::parsing::json::parse_document;

fn combined_map() -> LayoutMap {
    let value = parse_document(
        r#"{"id": {"type": "int32"},
            "balance": {"type": "float64"},
            "name": {"type": "string", "max_length": 16},
            "orders": {"type": "object[]", "max_items": 2,
                "schema": {"price": "float64", "amount": "float32", "side": "int32"}}}"#,
    )
    .unwrap();
    compile_layout(&value).unwrap()
}

#[test]
fn emission_is_deterministic() {
    let map = combined_map();

    let hpp1 = emit_declarations(&map);
    let hpp2 = emit_declarations(&map);
    assert_eq!(hpp1, hpp2);

    let cpp1 = emit_implementations(&map);
    let cpp2 = emit_implementations(&map);
    assert_eq!(cpp1, cpp2);
}

#[test]
fn declarations_carry_the_layout_constants() {
    let hpp = emit_declarations(&combined_map());

    assert!(hpp.contains("constexpr std::size_t OFFSET_TOTAL_SIZE = 66;"));
    assert!(hpp.contains("constexpr std::size_t OFFSET_id = 0;"));
    assert!(hpp.contains("constexpr std::size_t OFFSET_balance = 4;"));
    assert!(hpp.contains("constexpr std::size_t OFFSET_name = 12;"));
    assert!(hpp.contains("constexpr std::size_t name_MAX_LEN = 16;"));
    assert!(hpp.contains("constexpr std::size_t OFFSET_orders_count = 28;"));
    assert!(hpp.contains("constexpr std::size_t OFFSET_orders_base = 32;"));
    assert!(hpp.contains("constexpr std::size_t STRIDE_orders = 17;"));
}

#[test]
fn array_child_constants_skip_the_occupancy_byte() {
    let hpp = emit_declarations(&combined_map());

    assert!(hpp.contains("constexpr std::size_t OFFSET_orders_price = 1;"));
    assert!(hpp.contains("constexpr std::size_t OFFSET_orders_amount = 9;"));
    assert!(hpp.contains("constexpr std::size_t OFFSET_orders_side = 13;"));
}

#[test]
fn object_child_constants_are_absolute() {
    let value = parse_document(
        r#"{"pad": {"type": "int64"},
            "pos": {"type": "object", "schema": {"x": "float32", "y": "float64"}}}"#,
    )
    .unwrap();
    let map = compile_layout(&value).unwrap();
    let hpp = emit_declarations(&map);

    assert!(hpp.contains("constexpr std::size_t OFFSET_pos_x = 8;"));
    assert!(hpp.contains("constexpr std::size_t OFFSET_pos_y = 12;"));

    let cpp = emit_implementations(&map);
    assert!(cpp.contains("float get_pos_x() {"));
    assert!(cpp.contains("*reinterpret_cast<float*>((char*)base_ptr + OFFSET_pos_x)"));
}

#[test]
fn item_structs_precede_the_linkage_block() {
    let hpp = emit_declarations(&combined_map());

    let struct_pos = hpp.find("struct orders {").unwrap();
    let root_pos = hpp.find("struct root_layout {").unwrap();
    let extern_pos = hpp.find("extern \"C\" {").unwrap();
    assert!(struct_pos < root_pos);
    assert!(root_pos < extern_pos);

    assert!(hpp.contains("    double price;"));
    assert!(hpp.contains("    float amount;"));
    assert!(hpp.contains("    int side;"));
    assert!(hpp.contains("    char name[16];"));
    assert!(hpp.contains("    struct orders orders[2];"));
}

#[test]
fn declarations_list_the_whole_accessor_surface() {
    let hpp = emit_declarations(&combined_map());

    assert!(hpp.contains("void init_layout_buffer(const char* path);"));
    assert!(hpp.contains("int get_id();"));
    assert!(hpp.contains("void set_id(int value);"));
    assert!(hpp.contains("double get_balance();"));
    assert!(hpp.contains("const char* get_name();"));
    assert!(hpp.contains("void set_name(const char* value);"));
    assert!(hpp.contains("std::size_t get_orders_count();"));
    assert!(hpp.contains("void set_orders_count(std::size_t count);"));
    assert!(hpp.contains("double get_orders_price(std::size_t index);"));
    assert!(hpp.contains("void set_orders_price(std::size_t index, double value);"));
    assert!(hpp.contains("void pop_orders(std::size_t index);"));
    assert!(hpp.contains("struct orders get_orders_item(std::size_t index);"));
    assert!(hpp.contains(
        "void get_orders_items(std::size_t start, std::size_t count, struct orders* out_buffer);"
    ));
}

#[test]
fn implementations_are_self_contained() {
    let cpp = emit_implementations(&combined_map());

    // Everything the bodies reference is re-declared in the file itself.
    assert!(!cpp.contains("#include \"layout_ffi.hpp\""));
    assert!(cpp.contains("static void* base_ptr = nullptr;"));
    assert!(cpp.contains("constexpr std::size_t OFFSET_TOTAL_SIZE = 66;"));
    assert!(cpp.contains("constexpr std::size_t STRIDE_orders = 17;"));
    assert!(cpp.contains("struct orders {"));
    assert!(!cpp.contains("struct root_layout"));
}

#[test]
fn init_body_opens_truncates_and_maps() {
    let cpp = emit_implementations(&combined_map());

    assert!(cpp.contains("int fd = open(path, O_RDWR | O_CREAT, 0600);"));
    assert!(cpp.contains("if (ftruncate(fd, OFFSET_TOTAL_SIZE) < 0) {"));
    assert!(cpp.contains("MAP_SHARED, fd, 0);"));
    assert!(cpp.contains("base_ptr = mapped;"));
}

#[test]
fn array_bodies_compute_slot_addresses() {
    let cpp = emit_implementations(&combined_map());

    assert!(cpp.contains(
        "return *reinterpret_cast<double*>((char*)base_ptr + OFFSET_orders_base + \
         index * STRIDE_orders + OFFSET_orders_price);"
    ));
    assert!(cpp.contains("*((char*)base_ptr + OFFSET_orders_base + index * STRIDE_orders) = 0;"));
    assert!(cpp.contains("out.price = *reinterpret_cast<const double*>(item + OFFSET_orders_price);"));
    assert!(cpp.contains("out_buffer[i] = get_orders_item(start + i);"));
}

#[test]
fn int64_fields_emit_long_long_accessors() {
    let value = parse_document(r#"{"big": {"type": "int64"}}"#).unwrap();
    let map = compile_layout(&value).unwrap();

    let hpp = emit_declarations(&map);
    assert!(hpp.contains("long long get_big();"));
    assert!(hpp.contains("void set_big(long long value);"));
    assert!(hpp.contains("    long long big;"));

    let cpp = emit_implementations(&map);
    assert!(cpp.contains("long long get_big() {"));
    assert!(cpp.contains("*reinterpret_cast<long long*>((char*)base_ptr + OFFSET_big)"));
}

#[test]
fn string_setter_clamps_to_capacity() {
    let cpp = emit_implementations(&combined_map());
    assert!(cpp.contains("std::strncpy((char*)base_ptr + OFFSET_name, value, name_MAX_LEN);"));
}
