// Durable key/value storage on SQLite
// Small, boring, survives restarts - which is the whole point

pub mod error;
pub mod kv;

pub use error::{Result, StoreError};
pub use kv::{KeyValueStore, KvStore, MemoryStore};
