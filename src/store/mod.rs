//! Cache storage backends.

pub mod memory;

pub use memory::MemoryCache;
