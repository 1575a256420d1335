// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Key-value store abstraction
//!
//! Defines the trait for bucketed byte stores (SQLite, in-memory).

use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Bucketed key-value store
///
/// Values are opaque byte strings. A bucket is a named keyspace; reading
/// from a bucket that does not exist behaves like reading a missing key.
///
/// # Implementations
///
/// - `SqliteStore` -- Default, file-backed
/// - `MemoryStore` -- In-process, for tests
pub trait KvStore {
    /// Create a bucket if it does not already exist
    fn create_bucket(&self, bucket: &str) -> Result<()>;

    /// Get the value stored at `key`, or `None`
    fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` at `key`, creating the bucket if needed
    fn put(&self, bucket: &str, key: &str, value: &[u8]) -> Result<()>;

    /// Delete `key`; returns true if it existed
    fn delete(&self, bucket: &str, key: &str) -> Result<bool>;

    /// All keys in a bucket (sorted)
    fn keys(&self, bucket: &str) -> Result<Vec<String>>;

    /// All bucket names (sorted)
    fn buckets(&self) -> Result<Vec<String>>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    buckets: Mutex<BTreeMap<String, BTreeMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_buckets<T>(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, BTreeMap<String, Vec<u8>>>) -> T,
    ) -> Result<T> {
        let mut guard = self
            .buckets
            .lock()
            .map_err(|_| anyhow!("memory store mutex poisoned"))?;
        Ok(f(&mut *guard))
    }
}

impl KvStore for MemoryStore {
    fn create_bucket(&self, bucket: &str) -> Result<()> {
        self.with_buckets(|b| {
            b.entry(bucket.to_string()).or_default();
        })
    }

    fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>> {
        self.with_buckets(|b| b.get(bucket).and_then(|keys| keys.get(key)).cloned())
    }

    fn put(&self, bucket: &str, key: &str, value: &[u8]) -> Result<()> {
        self.with_buckets(|b| {
            b.entry(bucket.to_string())
                .or_default()
                .insert(key.to_string(), value.to_vec());
        })
    }

    fn delete(&self, bucket: &str, key: &str) -> Result<bool> {
        self.with_buckets(|b| {
            b.get_mut(bucket)
                .map(|keys| keys.remove(key).is_some())
                .unwrap_or(false)
        })
    }

    fn keys(&self, bucket: &str) -> Result<Vec<String>> {
        self.with_buckets(|b| {
            b.get(bucket)
                .map(|keys| keys.keys().cloned().collect())
                .unwrap_or_default()
        })
    }

    fn buckets(&self) -> Result<Vec<String>> {
        self.with_buckets(|b| b.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_put_get() {
        let store = MemoryStore::new();
        assert!(store.get("Cat", "Tom").unwrap().is_none());

        store.put("Cat", "Tom", &[1, 2, 3]).unwrap();
        assert_eq!(store.get("Cat", "Tom").unwrap(), Some(vec![1, 2, 3]));
        assert!(store.get("Dog", "Tom").unwrap().is_none());
    }

    #[test]
    fn test_memory_store_buckets_and_keys() {
        let store = MemoryStore::new();
        store.create_bucket("Dog").unwrap();
        store.put("Cat", "Tom", b"a").unwrap();
        store.put("Cat", "Garfield", b"b").unwrap();

        assert_eq!(store.buckets().unwrap(), vec!["Cat", "Dog"]);
        assert_eq!(store.keys("Cat").unwrap(), vec!["Garfield", "Tom"]);
        assert!(store.keys("Dog").unwrap().is_empty());
        assert!(store.keys("Fish").unwrap().is_empty());
    }

    #[test]
    fn test_memory_store_delete() {
        let store = MemoryStore::new();
        store.put("Cat", "Tom", b"a").unwrap();

        assert!(store.delete("Cat", "Tom").unwrap());
        assert!(!store.delete("Cat", "Tom").unwrap());
        assert!(!store.delete("Fish", "Nemo").unwrap());
    }
}
