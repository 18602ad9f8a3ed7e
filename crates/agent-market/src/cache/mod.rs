//! Versioned cache layer
//!
//! Values are stored under human-readable keys that embed the entity, the
//! operation, every argument and a version tag. Bumping the version makes
//! all earlier entries unreachable without deleting them.

pub mod key;
mod layer;
mod redis;
mod store;
pub mod table;
mod ttl;

pub use key::{KeyArg, KeyDescriptor, build_key, key_for};
pub use layer::{CacheBackend, CacheLayer, CacheStats};
pub use self::redis::RedisStore;
pub use store::{KeyValueStore, MemoryStore};
pub use table::{Cell, Row, Table};
pub use ttl::{TtlPolicy, VolatilityClass};
