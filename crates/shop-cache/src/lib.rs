//! Type-safe key-value cache for the shopfront client.
//!
//! This is the client's "local storage": a JSON-encoding [`Cache`] over a
//! byte-level [`KvBackend`]. Backends are provided for process memory, a
//! directory on disk, and (on `wasm32`) Spin's Key-Value Store.
//!
//! # Example
//!
//! ```rust,ignore
//! use shop_cache::Cache;
//!
//! let cache = Cache::open_dir("/var/lib/shop")?;
//!
//! cache.set("cart", &cart)?;
//! let cart: Option<Cart> = cache.get("cart")?;
//! cache.delete("cart")?;
//! ```

pub mod backend;
mod error;
mod kv;

pub use backend::{FileBackend, KvBackend, MemoryBackend};
pub use error::CacheError;
pub use kv::Cache;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, KvBackend};
}
