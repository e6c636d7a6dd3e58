//! # Memory-Mapped Backing Buffer
//!
//! `MappedBuffer` acquires the byte region that a compiled layout addresses:
//! it opens (or creates) the backing file owner-only, truncates it to the
//! layout's `total_size`, and maps it read-write shared. A fresh file starts
//! all-zero, which is a valid initial state for every layout: zero counts,
//! zero occupancy flags, zeroed scalars.
//!
//! The file descriptor is closed as soon as the mapping exists; the mapping
//! outlives it and is unmapped when `MappedBuffer` drops, which is the
//! caller's teardown point.

use std::fs::OpenOptions;
use std::path::Path;

use eyre::{ensure, Result, WrapErr};
use memmap2::MmapMut;

#[derive(Debug)]
pub struct MappedBuffer {
    mmap: MmapMut,
}

impl MappedBuffer {
    /// Opens or creates `path`, sizes it to exactly `size` bytes, and maps
    /// it read-write shared. The file is created with mode `rw-------`.
    pub fn create<P: AsRef<Path>>(path: P, size: usize) -> Result<Self> {
        let path = path.as_ref();

        ensure!(size > 0, "backing buffer size must be at least 1 byte");

        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let file = options
            .open(path)
            .wrap_err_with(|| format!("failed to open backing file '{}'", path.display()))?;

        file.set_len(size as u64)
            .wrap_err_with(|| format!("failed to truncate backing file to {} bytes", size))?;

        // SAFETY: MmapMut::map_mut is unsafe because memory-mapped files can
        // be modified externally, leading to undefined behavior. This is safe
        // because:
        // 1. The file was just opened read-write and sized to `size`; the
        //    mapping never extends past it
        // 2. The accessor layer assumes exclusive writer access; concurrent
        //    external modification is documented as undefined
        // 3. The mmap lifetime is tied to MappedBuffer, preventing
        //    use-after-unmap
        let mmap = unsafe {
            MmapMut::map_mut(&file)
                .wrap_err_with(|| format!("failed to memory-map '{}'", path.display()))?
        };

        // The mapping keeps the region alive without the descriptor.
        drop(file);

        Ok(Self { mmap })
    }

    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.mmap
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.mmap
    }

    /// Flushes dirty pages back to the backing file.
    pub fn sync(&self) -> Result<()> {
        self.mmap.flush().wrap_err("failed to sync mapped buffer to disk")
    }
}
