//! Raw byte storage behind [`Cache`](crate::Cache).

mod file;
mod memory;
#[cfg(target_arch = "wasm32")]
mod spin;

pub use file::FileBackend;
pub use memory::MemoryBackend;
#[cfg(target_arch = "wasm32")]
pub use spin::SpinBackend;

use crate::CacheError;

/// A string-keyed byte store.
///
/// Implementations do no serialization of their own; that is the job of
/// [`Cache`](crate::Cache).
pub trait KvBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError>;

    fn delete(&self, key: &str) -> Result<(), CacheError>;

    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get(key)?.is_some())
    }

    fn keys(&self) -> Result<Vec<String>, CacheError>;
}
