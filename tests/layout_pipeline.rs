//! # Layout Pipeline Tests
//!
//! End-to-end coverage of the compile → map → access → persist → emit
//! pipeline over real files:
//!
//! - Scalar and string round-trips through a mapped backing file
//! - Array insert/get/pop with the occupancy-byte protocol
//! - Descriptor save/load equality
//! - Deterministic FFI emission

use tempfile::tempdir;

use memlay::descriptor::DescriptorCodec;
use memlay::ffi::{emit_declarations, emit_implementations};
use memlay::parsing::parse_document;
use memlay::{compile_layout, FieldType, LayoutEngine, MappedBuffer, RegionAccessor};

mod scalar_round_trip {
    use super::*;

    #[test]
    fn values_survive_write_and_read_through_the_mapping() {
        let dir = tempdir().unwrap();
        let schema = r#"{"layout": {"id": {"type": "int32"}, "balance": {"type": "float64"}}}"#;
        let schema_path = dir.path().join("layout.json");
        std::fs::write(&schema_path, schema).unwrap();

        let mut engine = LayoutEngine::new();
        engine.load_layout_json(&schema_path).unwrap();
        assert_eq!(engine.mapped_size(), 12);

        engine
            .allocate_memory_from_file(dir.path().join("memory.buf"))
            .unwrap();

        let mut accessor = engine.accessor().unwrap();
        accessor.write_i32("id", 1234).unwrap();
        accessor.write_f64("balance", 55.5).unwrap();

        assert_eq!(accessor.read_i32("id").unwrap(), 1234);
        assert!((accessor.read_f64("balance").unwrap() - 55.5).abs() < 1e-9);
    }

    #[test]
    fn values_persist_in_the_backing_file() {
        let dir = tempdir().unwrap();
        let buf_path = dir.path().join("memory.buf");

        let value = parse_document(r#"{"id": {"type": "int32"}}"#).unwrap();
        let map = compile_layout(&value).unwrap();

        {
            let mut buffer = MappedBuffer::create(&buf_path, map.total_size).unwrap();
            let mut accessor = RegionAccessor::new(&map, buffer.as_mut_slice()).unwrap();
            accessor.write_i32("id", -77).unwrap();
            buffer.sync().unwrap();
        }

        let mut buffer = MappedBuffer::create(&buf_path, map.total_size).unwrap();
        let accessor = RegionAccessor::new(&map, buffer.as_mut_slice()).unwrap();
        assert_eq!(accessor.read_i32("id").unwrap(), -77);
    }
}

mod string_fields {
    use super::*;

    #[test]
    fn short_strings_keep_their_bytes_and_total_size_is_the_capacity() {
        let dir = tempdir().unwrap();

        let value = parse_document(r#"{"name": {"type": "string", "max_length": 32}}"#).unwrap();
        let map = compile_layout(&value).unwrap();
        assert_eq!(map.total_size, 32);

        let mut buffer = MappedBuffer::create(dir.path().join("memory.buf"), 32).unwrap();
        let mut accessor = RegionAccessor::new(&map, buffer.as_mut_slice()).unwrap();

        accessor.write_str("name", "olá").unwrap();
        let bytes = accessor.read_str_bytes("name").unwrap();
        assert_eq!(&bytes[..4], "olá".as_bytes());
        assert!(bytes[4..].iter().all(|&b| b == 0));
    }
}

mod array_operations {
    use super::*;

    const ORDERS_SCHEMA: &str = r#"{"orders": {"type": "object[]", "max_items": 4,
        "schema": {"price": "float64", "amount": "float32", "side": "int32"}}}"#;

    #[test]
    fn slot_writes_surface_through_descriptor_lookup() {
        let value = parse_document(ORDERS_SCHEMA).unwrap();
        let map = compile_layout(&value).unwrap();

        let orders = map.field("orders").unwrap();
        let FieldType::Array { item_stride, .. } = orders.field_type else {
            panic!("orders should compile to an array");
        };
        assert_eq!(item_stride, 17);
        assert_eq!(map.total_size, 72);

        // Mirror the emitted surface: write child fields of slot 0 and the
        // count directly into the zeroed region, then observe through the
        // accessor.
        let mut region = vec![0u8; map.total_size];
        let slot = orders.offset + 4;
        region[slot] = 1; // occupancy
        region[slot + 1..slot + 9].copy_from_slice(&9.87f64.to_le_bytes());
        region[slot + 9..slot + 13].copy_from_slice(&3.14f32.to_le_bytes());
        region[slot + 13..slot + 17].copy_from_slice(&1i32.to_le_bytes());
        region[orders.offset..orders.offset + 4].copy_from_slice(&1u32.to_le_bytes());

        let accessor = RegionAccessor::new(&map, &mut region).unwrap();
        assert_eq!(accessor.count("orders").unwrap(), 1);

        let item = accessor.get("orders", 0).unwrap().unwrap();
        assert_eq!(f64::from_le_bytes(item[0..8].try_into().unwrap()), 9.87);
        assert_eq!(f32::from_le_bytes(item[8..12].try_into().unwrap()), 3.14);
        assert_eq!(i32::from_le_bytes(item[12..16].try_into().unwrap()), 1);
    }

    #[test]
    fn insert_then_get_returns_the_item_bytes() {
        let dir = tempdir().unwrap();
        let value = parse_document(ORDERS_SCHEMA).unwrap();
        let map = compile_layout(&value).unwrap();

        let mut buffer =
            MappedBuffer::create(dir.path().join("memory.buf"), map.total_size).unwrap();
        let mut accessor = RegionAccessor::new(&map, buffer.as_mut_slice()).unwrap();

        let mut item = Vec::new();
        item.extend(101.5f64.to_le_bytes());
        item.extend(0.25f32.to_le_bytes());
        item.extend((-1i32).to_le_bytes());

        accessor.insert("orders", &item).unwrap();
        assert_eq!(accessor.count("orders").unwrap(), 1);
        assert_eq!(accessor.get("orders", 0).unwrap().unwrap(), &item[..]);
    }

    #[test]
    fn pop_leaves_count_and_other_slots_intact() {
        let dir = tempdir().unwrap();
        let value = parse_document(ORDERS_SCHEMA).unwrap();
        let map = compile_layout(&value).unwrap();

        let mut buffer =
            MappedBuffer::create(dir.path().join("memory.buf"), map.total_size).unwrap();
        let mut accessor = RegionAccessor::new(&map, buffer.as_mut_slice()).unwrap();

        for side in 0..3i32 {
            let mut item = Vec::new();
            item.extend((side as f64).to_le_bytes());
            item.extend((side as f32).to_le_bytes());
            item.extend(side.to_le_bytes());
            accessor.insert("orders", &item).unwrap();
        }

        accessor.pop("orders", 1).unwrap();

        assert_eq!(accessor.count("orders").unwrap(), 3);
        assert!(accessor.get("orders", 1).unwrap().is_none());
        assert!(accessor.get("orders", 0).unwrap().is_some());
        assert!(accessor.get("orders", 2).unwrap().is_some());
    }
}

mod descriptor_round_trip {
    use super::*;

    const COMBINED_SCHEMA: &str = r#"{
        "id": {"type": "int32"},
        "balance": {"type": "float64"},
        "name": {"type": "string", "max_length": 16},
        "orders": {"type": "object[]", "max_items": 2,
            "schema": {"price": "float64", "amount": "float32", "side": "int32"}}
    }"#;

    #[test]
    fn encode_decode_preserves_the_whole_map() {
        let value = parse_document(COMBINED_SCHEMA).unwrap();
        let m1 = compile_layout(&value).unwrap();
        assert_eq!(m1.total_size, 66);

        let bytes = DescriptorCodec::encode(&m1).unwrap();
        let m2 = DescriptorCodec::decode(&bytes).unwrap();

        assert_eq!(m1.total_size, m2.total_size);
        assert_eq!(m1, m2);

        let orders = m2.field("orders").unwrap();
        assert_eq!(orders.offset, 28);
        let children = orders.field_type.children().unwrap();
        assert_eq!(children.position("price"), Some(0));
        assert_eq!(children.position("amount"), Some(1));
        assert_eq!(children.position("side"), Some(2));
    }

    #[test]
    fn a_saved_descriptor_drives_a_fresh_engine() {
        let dir = tempdir().unwrap();
        let descriptor_path = dir.path().join("layout.ram");

        let value = parse_document(COMBINED_SCHEMA).unwrap();
        let map = compile_layout(&value).unwrap();
        DescriptorCodec::save(&map, &descriptor_path).unwrap();

        let mut engine = LayoutEngine::new();
        engine.load_descriptor(&descriptor_path).unwrap();
        assert_eq!(engine.mapped_size(), 66);

        engine
            .allocate_memory_from_file(dir.path().join("memory.buf"))
            .unwrap();
        let mut accessor = engine.accessor().unwrap();
        accessor.write_i32("id", 7).unwrap();
        assert_eq!(accessor.read_i32("id").unwrap(), 7);
    }
}

mod deterministic_emission {
    use super::*;

    #[test]
    fn emitted_files_are_byte_identical_across_runs() {
        let dir = tempdir().unwrap();
        let schema = r#"{"layout": {
            "id": {"type": "int32"},
            "name": {"type": "string", "max_length": 16},
            "orders": {"type": "object[]", "max_items": 2,
                "schema": {"price": "float64", "side": "int32"}}
        }}"#;
        let schema_path = dir.path().join("layout.json");
        std::fs::write(&schema_path, schema).unwrap();

        let mut engine = LayoutEngine::new();
        engine.load_layout_json(&schema_path).unwrap();

        let first = dir.path().join("first");
        let second = dir.path().join("second");
        std::fs::create_dir_all(&first).unwrap();
        std::fs::create_dir_all(&second).unwrap();

        for out in [&first, &second] {
            engine.generate_ffi_header(out.join("layout_ffi.hpp")).unwrap();
            engine.generate_ffi_source(out.join("layout_ffi.cpp")).unwrap();
        }

        assert_eq!(
            std::fs::read(first.join("layout_ffi.hpp")).unwrap(),
            std::fs::read(second.join("layout_ffi.hpp")).unwrap()
        );
        assert_eq!(
            std::fs::read(first.join("layout_ffi.cpp")).unwrap(),
            std::fs::read(second.join("layout_ffi.cpp")).unwrap()
        );
    }

    #[test]
    fn emitted_constants_match_the_compiled_map() {
        let value = parse_document(
            r#"{"id": {"type": "int32"},
                "balance": {"type": "float64"},
                "name": {"type": "string", "max_length": 16},
                "orders": {"type": "object[]", "max_items": 2,
                    "schema": {"price": "float64", "amount": "float32", "side": "int32"}}}"#,
        )
        .unwrap();
        let map = compile_layout(&value).unwrap();

        let hpp = emit_declarations(&map);
        let cpp = emit_implementations(&map);

        for text in [&hpp, &cpp] {
            assert!(text.contains("constexpr std::size_t OFFSET_TOTAL_SIZE = 66;"));
            assert!(text.contains("constexpr std::size_t OFFSET_id = 0;"));
            assert!(text.contains("constexpr std::size_t OFFSET_balance = 4;"));
            assert!(text.contains("constexpr std::size_t OFFSET_name = 12;"));
            assert!(text.contains("constexpr std::size_t OFFSET_orders_count = 28;"));
            assert!(text.contains("constexpr std::size_t OFFSET_orders_base = 32;"));
            assert!(text.contains("constexpr std::size_t STRIDE_orders = 17;"));
            assert!(text.contains("constexpr std::size_t OFFSET_orders_price = 1;"));
        }
    }
}
