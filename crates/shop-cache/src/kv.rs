//! Key-Value store wrapper with automatic serialization.

use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};

use crate::backend::{FileBackend, KvBackend, MemoryBackend};
use crate::CacheError;

/// Type-safe cache over a [`KvBackend`].
///
/// Values are stored as JSON. A value that is present but cannot be decoded
/// is reported as [`CacheError::Corrupt`], distinct from a missing key.
pub struct Cache<B = MemoryBackend> {
    backend: B,
}

impl<B: KvBackend> Cache<B> {
    /// Wrap an existing backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use shop_cache::Cache;
    /// let cache = Cache::in_memory();
    /// cache.set("greeting", &"hello").unwrap();
    /// let value: Option<String> = cache.get("greeting").unwrap();
    /// assert_eq!(value.as_deref(), Some("hello"));
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.backend.get(key)? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|source| CacheError::Corrupt {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Serialize and store a value.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value).map_err(CacheError::SerializeError)?;
        tracing::trace!(key, bytes = bytes.len(), "cache write");
        self.backend.set(key, &bytes)
    }

    /// Delete a value. Deleting a missing key is not an error.
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.backend.delete(key)
    }

    /// Check if a key exists in the cache.
    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.backend.exists(key)
    }

    /// All keys, sorted where the backend supports it.
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        self.backend.keys()
    }

    /// Get the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl Cache<MemoryBackend> {
    /// Cache that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }
}

impl Cache<FileBackend> {
    /// Cache persisted as files under `dir`.
    pub fn open_dir(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        Ok(Self::new(FileBackend::open(dir)?))
    }
}

#[cfg(target_arch = "wasm32")]
impl Cache<crate::backend::SpinBackend> {
    /// Open the default Spin Key-Value store.
    pub fn open_default() -> Result<Self, CacheError> {
        Ok(Self::new(crate::backend::SpinBackend::open_default()?))
    }

    /// Open a named Spin Key-Value store.
    pub fn open(name: &str) -> Result<Self, CacheError> {
        Ok(Self::new(crate::backend::SpinBackend::open(name)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Prefs {
        theme: String,
        page_size: u32,
    }

    #[test]
    fn test_round_trip() {
        let cache = Cache::in_memory();
        let prefs = Prefs {
            theme: "dark".into(),
            page_size: 24,
        };

        cache.set("prefs", &prefs).unwrap();
        assert!(cache.exists("prefs").unwrap());
        assert_eq!(cache.get::<Prefs>("prefs").unwrap(), Some(prefs));

        cache.delete("prefs").unwrap();
        assert_eq!(cache.get::<Prefs>("prefs").unwrap(), None);
    }

    #[test]
    fn test_corrupt_value_is_distinct_from_missing() {
        let backend = MemoryBackend::new();
        backend.set("prefs", b"{not json").unwrap();
        let cache = Cache::new(backend);

        let err = cache.get::<Prefs>("prefs").unwrap_err();
        assert!(matches!(err, CacheError::Corrupt { ref key, .. } if key == "prefs"));
        assert!(cache.get::<Prefs>("other").unwrap().is_none());
    }

    #[test]
    fn test_wrong_shape_is_corrupt() {
        let cache = Cache::in_memory();
        cache.set("prefs", &vec![1, 2, 3]).unwrap();
        assert!(matches!(
            cache.get::<Prefs>("prefs"),
            Err(CacheError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_file_cache_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let cache = Cache::open_dir(dir.path()).unwrap();
            cache.set("count", &7u32).unwrap();
        }
        let cache = Cache::open_dir(dir.path()).unwrap();
        assert_eq!(cache.get::<u32>("count").unwrap(), Some(7));
        assert_eq!(cache.keys().unwrap(), vec!["count"]);
    }
}
