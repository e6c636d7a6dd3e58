//! # Descriptor Persistence
//!
//! Serializes a compiled `LayoutMap` to a self-describing binary blob and
//! reloads it exactly. Descriptor files are portable across processes on
//! the same host architecture.
//!
//! ## File Format
//!
//! ```text
//! +-------------------+ Offset 0
//! | File Header       |
//! | (32 bytes)        |
//! +-------------------+ Offset 32
//! | Field Payload     |
//! | (variable length) |
//! +-------------------+
//! ```
//!
//! The header carries magic bytes, a format version, and a CRC32 of the
//! payload, so truncation and corruption are detected before any field is
//! decoded. The payload is a length-prefixed, little-endian encoding of the
//! field tree; name→index maps are never serialized and are rebuilt from
//! field order on load.
//!
//! ## Module Structure
//!
//! - `header`: the fixed 32-byte file header (zerocopy struct)
//! - `persistence`: payload encode/decode and the file-level save/load

pub mod header;
pub mod persistence;

pub use header::DescriptorFileHeader;
pub use persistence::DescriptorCodec;
