//! Durable storage for GradePal.
//!
//! This module provides the key-value substrate the course store persists
//! to, with file-based and in-memory backends.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;
pub use traits::KeyValueStore;
