//! # Region Module
//!
//! The runtime half of memlay: acquiring the backing byte region and
//! manipulating it through a compiled `LayoutMap`.
//!
//! ## Ownership
//!
//! Neither the layout compiler nor the accessor owns the backing storage.
//! `MappedBuffer` maps a file of exactly `total_size` bytes and hands out
//! plain slices; `RegionAccessor` borrows a map and a mutable slice for the
//! duration of an access session. All offsets are computed by descriptor
//! lookup on every call; no pointers are cached beyond the region base.
//!
//! ## Concurrency
//!
//! Single writer assumed. Writes are plain host-order stores; if the
//! mapping is shared with another process, that process observes updates
//! under the OS's shared-mapping consistency rules only.
//!
//! ## Module Structure
//!
//! - `mmap`: `MappedBuffer`, the file-backed byte region
//! - `accessor`: `RegionAccessor`, named field access over the region

pub mod accessor;
pub mod mmap;

pub use accessor::RegionAccessor;
pub use mmap::MappedBuffer;
