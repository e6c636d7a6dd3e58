//! # Descriptor File Header
//!
//! Fixed 32-byte header at the start of every descriptor file.
//!
//! ```text
//! Offset  Size  Description
//! 0       16    Magic: "memlay layout v1"
//! 16      4     Version: 1 (u32 little-endian)
//! 20      4     Payload CRC32 (u32 little-endian, CRC_32_ISO_HDLC)
//! 24      8     Payload length (u64 little-endian)
//! ```
//!
//! ## Zerocopy Safety
//!
//! The header struct derives the zerocopy traits so it can be read from and
//! written as raw bytes without copies:
//! - `FromBytes`: safe to read from arbitrary bytes
//! - `IntoBytes`: safe to write as bytes
//! - `Immutable`: no interior mutability
//! - `KnownLayout`: compile-time size verification
//! - `Unaligned`: works at any byte offset
//!
//! ## Endianness
//!
//! All multi-byte fields use little-endian encoding via the zerocopy
//! `U32`/`U64` wrappers.

use crc::{Crc, CRC_32_ISO_HDLC};
use eyre::{ensure, Result};
use zerocopy::little_endian::{U32, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

pub const DESCRIPTOR_MAGIC: &[u8; 16] = b"memlay layout v1";
pub const CURRENT_VERSION: u32 = 1;
pub const DESCRIPTOR_HEADER_SIZE: usize = 32;

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct DescriptorFileHeader {
    magic: [u8; 16],
    version: U32,
    payload_crc: U32,
    payload_len: U64,
}

const _: () = assert!(std::mem::size_of::<DescriptorFileHeader>() == DESCRIPTOR_HEADER_SIZE);

impl DescriptorFileHeader {
    pub fn for_payload(payload: &[u8]) -> Self {
        Self {
            magic: *DESCRIPTOR_MAGIC,
            version: U32::new(CURRENT_VERSION),
            payload_crc: U32::new(CRC32.checksum(payload)),
            payload_len: U64::new(payload.len() as u64),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<&Self> {
        ensure!(
            bytes.len() >= DESCRIPTOR_HEADER_SIZE,
            "corrupt layout descriptor: {} bytes is too small for the file header",
            bytes.len()
        );

        let header = Self::ref_from_bytes(&bytes[..DESCRIPTOR_HEADER_SIZE])
            .map_err(|e| eyre::eyre!("corrupt layout descriptor: unreadable header: {:?}", e))?;

        ensure!(
            &header.magic == DESCRIPTOR_MAGIC,
            "corrupt layout descriptor: bad magic bytes"
        );

        ensure!(
            header.version.get() == CURRENT_VERSION,
            "corrupt layout descriptor: unsupported version {} (expected {})",
            header.version.get(),
            CURRENT_VERSION
        );

        Ok(header)
    }

    /// Checks the payload length and CRC recorded in the header against the
    /// bytes that follow it.
    pub fn verify_payload(&self, payload: &[u8]) -> Result<()> {
        ensure!(
            payload.len() as u64 == self.payload_len.get(),
            "corrupt layout descriptor: payload is {} bytes, header records {}",
            payload.len(),
            self.payload_len.get()
        );

        let crc = CRC32.checksum(payload);
        ensure!(
            crc == self.payload_crc.get(),
            "corrupt layout descriptor: payload checksum {:08x} does not match header {:08x}",
            crc,
            self.payload_crc.get()
        );

        Ok(())
    }

    pub fn version(&self) -> u32 {
        self.version.get()
    }

    pub fn payload_len(&self) -> u64 {
        self.payload_len.get()
    }

    pub fn payload_crc(&self) -> u32 {
        self.payload_crc.get()
    }
}
