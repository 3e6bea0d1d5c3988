//! In-process symbol cache.

mod memory;

pub use memory::MemoryCache;
