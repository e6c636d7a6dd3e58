//! # Region Accessor
//!
//! `RegionAccessor` implements named field access over a `(LayoutMap,
//! mutable byte region)` pair: scalar read/write, string copy, and array
//! insert/pop/get with per-slot occupancy tracking.
//!
//! ## Addressing
//!
//! Every operation resolves the field descriptor by name and computes the
//! byte span on the spot:
//!
//! ```text
//! scalar/string/object   offset .. offset + size
//! array count            u32 little-endian at count_offset
//! array slot i           offset + 4 + i * item_stride
//! array item data        slot + 1 .. slot + item_stride   (skip occupancy byte)
//! ```
//!
//! ## Array Semantics
//!
//! `insert` appends at the logical tail (`count`) and never reuses vacant
//! slots below it. `pop` clears the slot's occupancy byte and leaves `count`
//! untouched: a popped slot reads as absent, surviving slots and the count
//! are unchanged, and the array still reports full after `max_items` total
//! inserts. An item is live iff its occupancy byte is 1 and its index is
//! below `count`.

use eyre::{bail, ensure, Result};

use crate::layout::map::{FieldDescriptor, LayoutMap};
use crate::layout::types::FieldType;

#[derive(Debug)]
pub struct RegionAccessor<'a> {
    map: &'a LayoutMap,
    data: &'a mut [u8],
}

impl<'a> RegionAccessor<'a> {
    pub fn new(map: &'a LayoutMap, data: &'a mut [u8]) -> Result<Self> {
        ensure!(
            data.len() == map.total_size,
            "region is {} bytes but the layout needs {}",
            data.len(),
            map.total_size
        );
        Ok(Self { map, data })
    }

    fn field(&self, name: &str) -> Result<&'a FieldDescriptor> {
        self.map
            .field(name)
            .ok_or_else(|| eyre::eyre!("unknown field '{}'", name))
    }

    fn resolve(&self, name: &str, index: usize) -> Result<Option<(usize, usize)>> {
        resolve_span(self.map, self.data, name, index)
    }

    /// Returns the bytes backing a field, or a single array item.
    ///
    /// For scalars, strings and objects `index` must be 0. For arrays the
    /// returned slice covers the item payload (`item_stride - 1` bytes,
    /// occupancy byte skipped).
    pub fn get(&self, name: &str, index: usize) -> Result<Option<&[u8]>> {
        Ok(self
            .resolve(name, index)?
            .map(|(start, len)| &self.data[start..start + len]))
    }

    /// Mutable variant of [`get`](Self::get).
    pub fn get_mut(&mut self, name: &str, index: usize) -> Result<Option<&mut [u8]>> {
        match self.resolve(name, index)? {
            Some((start, len)) => Ok(Some(&mut self.data[start..start + len])),
            None => Ok(None),
        }
    }

    /// Appends an item to an array field, marking its slot occupied.
    ///
    /// `item` must supply at least `item_stride - 1` bytes; exactly that
    /// many are copied.
    pub fn insert(&mut self, name: &str, item: &[u8]) -> Result<()> {
        let field = self.field(name)?;
        let FieldType::Array {
            count_offset,
            item_stride,
            max_items,
            has_used_flag,
            ..
        } = field.field_type
        else {
            bail!(
                "insert only supports array fields, '{}' is {:?}",
                name,
                field.field_type.tag()
            );
        };

        let count = self.read_count_at(count_offset) as usize;
        ensure!(
            count < max_items,
            "array '{}' is full ({} items)",
            name,
            max_items
        );

        let payload = item_stride - has_used_flag as usize;
        ensure!(
            item.len() >= payload,
            "item for '{}' must be at least {} bytes, got {}",
            name,
            payload,
            item.len()
        );

        let slot = field.offset + 4 + count * item_stride;
        if has_used_flag {
            self.data[slot] = 1;
        }
        let start = slot + has_used_flag as usize;
        self.data[start..start + payload].copy_from_slice(&item[..payload]);

        self.write_count_at(count_offset, (count + 1) as u32);
        Ok(())
    }

    /// Clears the occupancy byte of one array slot. The count is not
    /// decremented; the slot becomes a tombstone.
    pub fn pop(&mut self, name: &str, index: usize) -> Result<()> {
        let field = self.field(name)?;
        let FieldType::Array {
            count_offset,
            item_stride,
            has_used_flag,
            ..
        } = field.field_type
        else {
            bail!(
                "pop only supports array fields, '{}' is {:?}",
                name,
                field.field_type.tag()
            );
        };

        let count = self.read_count_at(count_offset) as usize;
        ensure!(
            index < count,
            "index {} out of bounds for array '{}' (count {})",
            index,
            name,
            count
        );

        if has_used_flag {
            let slot = field.offset + 4 + index * item_stride;
            self.data[slot] = 0;
        }
        Ok(())
    }

    /// Current item count of an array field.
    pub fn count(&self, name: &str) -> Result<usize> {
        let field = self.field(name)?;
        let FieldType::Array { count_offset, .. } = field.field_type else {
            bail!(
                "count only supports array fields, '{}' is {:?}",
                name,
                field.field_type.tag()
            );
        };
        Ok(self.read_count_at(count_offset) as usize)
    }

    pub fn read_i32(&self, name: &str) -> Result<i32> {
        let off = self.scalar_offset(name, &FieldType::Int32)?;
        Ok(i32::from_le_bytes(self.fixed_bytes::<4>(off)))
    }

    pub fn read_i64(&self, name: &str) -> Result<i64> {
        let off = self.scalar_offset(name, &FieldType::Int64)?;
        Ok(i64::from_le_bytes(self.fixed_bytes::<8>(off)))
    }

    pub fn read_f32(&self, name: &str) -> Result<f32> {
        let off = self.scalar_offset(name, &FieldType::Float32)?;
        Ok(f32::from_le_bytes(self.fixed_bytes::<4>(off)))
    }

    pub fn read_f64(&self, name: &str) -> Result<f64> {
        let off = self.scalar_offset(name, &FieldType::Float64)?;
        Ok(f64::from_le_bytes(self.fixed_bytes::<8>(off)))
    }

    pub fn write_i32(&mut self, name: &str, value: i32) -> Result<()> {
        let off = self.scalar_offset(name, &FieldType::Int32)?;
        self.data[off..off + 4].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn write_i64(&mut self, name: &str, value: i64) -> Result<()> {
        let off = self.scalar_offset(name, &FieldType::Int64)?;
        self.data[off..off + 8].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn write_f32(&mut self, name: &str, value: f32) -> Result<()> {
        let off = self.scalar_offset(name, &FieldType::Float32)?;
        self.data[off..off + 4].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn write_f64(&mut self, name: &str, value: f64) -> Result<()> {
        let off = self.scalar_offset(name, &FieldType::Float64)?;
        self.data[off..off + 8].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Copies a string into its field, clamped to the field's capacity, and
    /// zero-fills the tail. A source of exactly `max_length` bytes leaves no
    /// terminator; consumers must treat the field as a bounded, possibly
    /// unterminated byte sequence.
    pub fn write_str(&mut self, name: &str, value: &str) -> Result<()> {
        let field = self.field(name)?;
        let FieldType::String { max_length } = field.field_type else {
            bail!(
                "field '{}' is not a string, it is {:?}",
                name,
                field.field_type.tag()
            );
        };

        let bytes = value.as_bytes();
        let n = bytes.len().min(max_length);
        let dst = &mut self.data[field.offset..field.offset + max_length];
        dst[..n].copy_from_slice(&bytes[..n]);
        dst[n..].fill(0);
        Ok(())
    }

    /// The full capacity of a string field, including any zero padding.
    pub fn read_str_bytes(&self, name: &str) -> Result<&[u8]> {
        let field = self.field(name)?;
        let FieldType::String { max_length } = field.field_type else {
            bail!(
                "field '{}' is not a string, it is {:?}",
                name,
                field.field_type.tag()
            );
        };
        Ok(&self.data[field.offset..field.offset + max_length])
    }

    fn scalar_offset(&self, name: &str, expected: &FieldType) -> Result<usize> {
        let field = self.field(name)?;
        ensure!(
            field.field_type == *expected,
            "field '{}' is {:?}, not {:?}",
            name,
            field.field_type.tag(),
            expected.tag()
        );
        Ok(field.offset)
    }

    fn fixed_bytes<const N: usize>(&self, off: usize) -> [u8; N] {
        let mut raw = [0u8; N];
        raw.copy_from_slice(&self.data[off..off + N]);
        raw
    }

    fn read_count_at(&self, count_offset: usize) -> u32 {
        u32::from_le_bytes([
            self.data[count_offset],
            self.data[count_offset + 1],
            self.data[count_offset + 2],
            self.data[count_offset + 3],
        ])
    }

    fn write_count_at(&mut self, count_offset: usize, count: u32) {
        self.data[count_offset..count_offset + 4].copy_from_slice(&count.to_le_bytes());
    }
}

/// Resolves a field (and slot, for arrays) to its data span within
/// `region`. Returns `None` when the request addresses nothing: a non-zero
/// index on a non-array field, an index at or past the current count, or a
/// vacant slot.
pub fn resolve_span(
    map: &LayoutMap,
    region: &[u8],
    name: &str,
    index: usize,
) -> Result<Option<(usize, usize)>> {
    ensure!(
        region.len() == map.total_size,
        "region is {} bytes but the layout needs {}",
        region.len(),
        map.total_size
    );

    let field = map
        .field(name)
        .ok_or_else(|| eyre::eyre!("unknown field '{}'", name))?;

    match field.field_type {
        FieldType::Array {
            count_offset,
            item_stride,
            max_items,
            has_used_flag,
            ..
        } => {
            let count = u32::from_le_bytes([
                region[count_offset],
                region[count_offset + 1],
                region[count_offset + 2],
                region[count_offset + 3],
            ]) as usize;
            // The count lives in caller-writable memory; clamp it to the
            // slot capacity so a scribbled prefix cannot address past the
            // field.
            if index >= count.min(max_items) {
                return Ok(None);
            }

            let slot = field.offset + 4 + index * item_stride;
            if has_used_flag && region[slot] == 0 {
                return Ok(None);
            }

            let skip = has_used_flag as usize;
            Ok(Some((slot + skip, item_stride - skip)))
        }
        _ => {
            if index != 0 {
                return Ok(None);
            }
            Ok(Some((field.offset, field.size)))
        }
    }
}
