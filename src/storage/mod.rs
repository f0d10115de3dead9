//! Key-value storage backing the session token and report filters
//!
//! Two lifetimes exist: a persistent store that outlives the process
//! (`FileStore`) and a session-scoped store that lives as long as the
//! process does (`MemoryStore`).

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::Result;

/// String values stored under fixed keys
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key is absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value; removing an absent key succeeds
    fn remove(&self, key: &str) -> Result<()>;
}
