// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Animal persistence on top of a key-value store
//!
//! Each variant kind gets its own bucket; animals are keyed by name and
//! stored as encoded envelopes.

use crate::config::Config;
use crate::sqlite::SqliteStore;
use crate::store::KvStore;
use anyhow::{bail, Context, Result};
use menagerie::{from_bytes, to_bytes, Animal, VariantRegistry};

/// Stores and retrieves animals through their envelope encoding
pub struct Kennel<'r, S: KvStore> {
    store: S,
    registry: &'r VariantRegistry,
}

impl<'r> Kennel<'r, SqliteStore> {
    /// Open a SQLite-backed kennel as described by `config`
    pub fn open(config: &Config, registry: &'r VariantRegistry) -> Result<Self> {
        let store = SqliteStore::open(&config.db_path, config.open_timeout())?;
        let kennel = Self::new(store, registry);
        if config.create_missing_buckets {
            kennel.init_buckets()?;
        }
        Ok(kennel)
    }
}

impl<'r, S: KvStore> Kennel<'r, S> {
    pub fn new(store: S, registry: &'r VariantRegistry) -> Self {
        Self { store, registry }
    }

    /// Create one bucket per registered variant
    pub fn init_buckets(&self) -> Result<()> {
        for tag in self.registry.tags() {
            self.store.create_bucket(&tag)?;
        }
        Ok(())
    }

    /// Encode `animal` and store it under its kind and name
    ///
    /// Returns the number of bytes stored.
    pub fn save(&self, animal: &dyn Animal) -> Result<usize> {
        let (kind, name) = (animal.kind(), animal.name());
        if name.is_empty() {
            bail!("cannot save a {} without a name", kind);
        }

        let bytes = to_bytes(self.registry, animal)
            .with_context(|| format!("Failed to encode {} '{}'", kind, name))?;
        self.store
            .put(kind, name, &bytes)
            .with_context(|| format!("Failed to save {} '{}'", kind, name))?;

        tracing::info!("Saved {} '{}' ({} bytes)", kind, name, bytes.len());
        Ok(bytes.len())
    }

    /// Raw envelope bytes stored under `kind` / `name`
    pub fn load_raw(&self, kind: &str, name: &str) -> Result<Option<Vec<u8>>> {
        self.store
            .get(kind, name)
            .with_context(|| format!("Failed to read {} '{}'", kind, name))
    }

    /// Load and decode the animal stored under `kind` / `name`
    pub fn load(&self, kind: &str, name: &str) -> Result<Option<Box<dyn Animal>>> {
        let Some(bytes) = self.load_raw(kind, name)? else {
            tracing::debug!("No {} named '{}' in kennel", kind, name);
            return Ok(None);
        };

        let animal = from_bytes(self.registry, &bytes)
            .with_context(|| format!("Failed to decode {} '{}'", kind, name))?;
        if animal.kind() != kind {
            bail!(
                "entry '{}' in bucket {} decodes as a {}",
                name,
                kind,
                animal.kind()
            );
        }

        tracing::info!("Loaded {} '{}'", kind, name);
        Ok(Some(animal))
    }

    /// Remove an animal; returns true if it was present
    pub fn remove(&self, kind: &str, name: &str) -> Result<bool> {
        self.store
            .delete(kind, name)
            .with_context(|| format!("Failed to remove {} '{}'", kind, name))
    }

    /// Names stored for a kind (sorted)
    pub fn names(&self, kind: &str) -> Result<Vec<String>> {
        self.store.keys(kind)
    }

    /// Kinds that have a bucket (sorted)
    pub fn kinds(&self) -> Result<Vec<String>> {
        self.store.buckets()
    }

    pub fn registry(&self) -> &'r VariantRegistry {
        self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
