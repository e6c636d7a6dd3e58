//! # Layout Descriptor Codec
//!
//! Encodes a `LayoutMap` into the descriptor payload and decodes it back.
//!
//! ## Payload Format
//!
//! ```text
//! total_size: u64
//! field_count: u32
//! For each field (recursively):
//!   - name_len: u16
//!   - name: UTF-8 bytes (name_len bytes)
//!   - kind: u8 (TypeTag code)
//!   - offset: u64
//!   - size: u64
//!   - count_offset: u64   (0 unless array)
//!   - stride: u64         (0 unless array)
//!   - max_items: u64      (0 unless array)
//!   - has_used_flag: u8   (0 or 1)
//!   - child_count: u32
//!   - children: child_count fields
//! ```
//!
//! All integers are little-endian. A string field's capacity is not
//! serialized separately; on decode it is reconstructed from `size`.
//! Name→index maps are rebuilt from child order.
//!
//! ## Guarantees
//!
//! `decode(encode(m)) == m` for every well-formed map. Every read is
//! bounds-checked; a truncated or malformed payload reports which record
//! was being read when the data ran out.

use eyre::{bail, ensure, Result, WrapErr};
use std::path::Path;
use zerocopy::IntoBytes;

use crate::descriptor::header::{DescriptorFileHeader, DESCRIPTOR_HEADER_SIZE};
use crate::layout::map::{FieldDescriptor, FieldSet, LayoutMap};
use crate::layout::types::{FieldType, TypeTag};

pub struct DescriptorCodec;

impl DescriptorCodec {
    /// Encodes a map into a complete descriptor file image (header +
    /// payload).
    pub fn encode(map: &LayoutMap) -> Result<Vec<u8>> {
        let mut payload = Vec::new();

        payload.extend((map.total_size as u64).to_le_bytes());
        payload.extend((map.fields.len() as u32).to_le_bytes());

        for field in &map.fields {
            Self::encode_field(field, &mut payload)?;
        }

        let header = DescriptorFileHeader::for_payload(&payload);
        let mut out = Vec::with_capacity(DESCRIPTOR_HEADER_SIZE + payload.len());
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(&payload);
        Ok(out)
    }

    fn encode_field(field: &FieldDescriptor, buf: &mut Vec<u8>) -> Result<()> {
        let name_bytes = field.name.as_bytes();
        ensure!(
            name_bytes.len() <= u16::MAX as usize,
            "field name '{}' is too long (max {} bytes)",
            field.name,
            u16::MAX
        );
        buf.extend((name_bytes.len() as u16).to_le_bytes());
        buf.extend(name_bytes);

        buf.push(field.field_type.tag().code());
        buf.extend((field.offset as u64).to_le_bytes());
        buf.extend((field.size as u64).to_le_bytes());

        let (count_offset, stride, max_items, has_used_flag) = match &field.field_type {
            FieldType::Array {
                count_offset,
                item_stride,
                max_items,
                has_used_flag,
                ..
            } => (
                *count_offset as u64,
                *item_stride as u64,
                *max_items as u64,
                *has_used_flag,
            ),
            _ => (0, 0, 0, false),
        };
        buf.extend(count_offset.to_le_bytes());
        buf.extend(stride.to_le_bytes());
        buf.extend(max_items.to_le_bytes());
        buf.push(has_used_flag as u8);

        let children: &[FieldDescriptor] = field
            .field_type
            .children()
            .map(|set| set.fields())
            .unwrap_or(&[]);
        buf.extend((children.len() as u32).to_le_bytes());
        for child in children {
            Self::encode_field(child, buf)?;
        }

        Ok(())
    }

    /// Decodes a complete descriptor file image produced by `encode`.
    pub fn decode(bytes: &[u8]) -> Result<LayoutMap> {
        let header = DescriptorFileHeader::from_bytes(bytes)?;
        let payload = &bytes[DESCRIPTOR_HEADER_SIZE..];
        header.verify_payload(payload)?;

        let mut pos = 0usize;

        let total_size = Self::read_u64(payload, &mut pos, "total size")? as usize;
        let field_count = Self::read_u32(payload, &mut pos, "field count")?;

        let mut fields = FieldSet::new();
        for _ in 0..field_count {
            let field = Self::decode_field(payload, &mut pos)?;
            fields.push(field)?;
        }

        ensure!(
            pos == payload.len(),
            "corrupt layout descriptor: {} trailing bytes after the last field",
            payload.len() - pos
        );

        Ok(LayoutMap { total_size, fields })
    }

    fn decode_field(bytes: &[u8], pos: &mut usize) -> Result<FieldDescriptor> {
        let name_len = Self::read_u16(bytes, pos, "field name length")? as usize;
        ensure!(
            *pos + name_len <= bytes.len(),
            "corrupt layout descriptor: unexpected end of data reading field name"
        );
        let name = std::str::from_utf8(&bytes[*pos..*pos + name_len])
            .map_err(|e| eyre::eyre!("corrupt layout descriptor: invalid UTF-8 in field name: {}", e))?
            .to_string();
        *pos += name_len;

        let tag_code = Self::read_u8(bytes, pos, "kind tag")?;
        let tag = match TypeTag::from_code(tag_code) {
            Some(tag) => tag,
            None => bail!("corrupt layout descriptor: unknown kind tag {}", tag_code),
        };

        let offset = Self::read_u64(bytes, pos, "field offset")? as usize;
        let size = Self::read_u64(bytes, pos, "field size")? as usize;
        let count_offset = Self::read_u64(bytes, pos, "count offset")? as usize;
        let stride = Self::read_u64(bytes, pos, "item stride")? as usize;
        let max_items = Self::read_u64(bytes, pos, "max items")? as usize;
        let has_used_flag = Self::read_u8(bytes, pos, "used flag")? != 0;

        let child_count = Self::read_u32(bytes, pos, "child count")?;
        let mut children = FieldSet::new();
        for _ in 0..child_count {
            let child = Self::decode_field(bytes, pos)?;
            children.push(child)?;
        }

        let field_type = match tag {
            TypeTag::Int32 => FieldType::Int32,
            TypeTag::Int64 => FieldType::Int64,
            TypeTag::Float32 => FieldType::Float32,
            TypeTag::Float64 => FieldType::Float64,
            TypeTag::String => FieldType::String { max_length: size },
            TypeTag::Object => FieldType::Object { children },
            TypeTag::Array => FieldType::Array {
                children,
                count_offset,
                item_stride: stride,
                max_items,
                has_used_flag,
            },
        };

        Ok(FieldDescriptor {
            name,
            offset,
            size,
            field_type,
        })
    }

    /// Writes the encoded descriptor to a file, replacing any previous
    /// content.
    pub fn save<P: AsRef<Path>>(map: &LayoutMap, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = Self::encode(map)?;
        std::fs::write(path, bytes)
            .wrap_err_with(|| format!("failed to write descriptor file '{}'", path.display()))
    }

    /// Reads and decodes a descriptor file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<LayoutMap> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .wrap_err_with(|| format!("failed to read descriptor file '{}'", path.display()))?;
        Self::decode(&bytes)
            .wrap_err_with(|| format!("failed to decode descriptor file '{}'", path.display()))
    }

    fn read_u8(bytes: &[u8], pos: &mut usize, what: &str) -> Result<u8> {
        ensure!(
            *pos + 1 <= bytes.len(),
            "corrupt layout descriptor: unexpected end of data reading {}",
            what
        );
        let v = bytes[*pos];
        *pos += 1;
        Ok(v)
    }

    fn read_u16(bytes: &[u8], pos: &mut usize, what: &str) -> Result<u16> {
        ensure!(
            *pos + 2 <= bytes.len(),
            "corrupt layout descriptor: unexpected end of data reading {}",
            what
        );
        let v = u16::from_le_bytes([bytes[*pos], bytes[*pos + 1]]);
        *pos += 2;
        Ok(v)
    }

    fn read_u32(bytes: &[u8], pos: &mut usize, what: &str) -> Result<u32> {
        ensure!(
            *pos + 4 <= bytes.len(),
            "corrupt layout descriptor: unexpected end of data reading {}",
            what
        );
        let v = u32::from_le_bytes([
            bytes[*pos],
            bytes[*pos + 1],
            bytes[*pos + 2],
            bytes[*pos + 3],
        ]);
        *pos += 4;
        Ok(v)
    }

    fn read_u64(bytes: &[u8], pos: &mut usize, what: &str) -> Result<u64> {
        ensure!(
            *pos + 8 <= bytes.len(),
            "corrupt layout descriptor: unexpected end of data reading {}",
            what
        );
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&bytes[*pos..*pos + 8]);
        *pos += 8;
        Ok(u64::from_le_bytes(raw))
    }
}
