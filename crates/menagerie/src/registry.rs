// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use crate::animal::{Animal, Variant};
use crate::error::{CodecError, RegistryError};
use crate::variants::{Cat, Dog};

/// Produces an empty instance of a registered variant.
pub type Factory = fn() -> Box<dyn Animal>;

// ---------------------------------------------------------------------------
// VariantRegistry
// ---------------------------------------------------------------------------

/// Map from variant tag to zero-value factory.
///
/// Build it once at startup, then share it by reference with encoders and
/// decoders. Nothing in this crate mutates a registry after that point.
#[derive(Clone, Default)]
pub struct VariantRegistry {
    factories: HashMap<String, Factory>,
}

impl VariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        VariantRegistry {
            factories: HashMap::new(),
        }
    }

    /// Registry with every built-in variant (Cat, Dog).
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register_variant::<Cat>();
        registry.register_variant::<Dog>();
        registry
    }

    /// Associate `tag` with `factory`.
    ///
    /// Re-registering a tag replaces the previous factory and logs a warning.
    /// Returns `true` when an existing entry was replaced.
    pub fn register(&mut self, tag: impl Into<String>, factory: Factory) -> bool {
        let tag = tag.into();
        let replaced = self.factories.insert(tag.clone(), factory).is_some();
        if replaced {
            log::warn!("[menagerie] variant '{}' registered twice, last registration wins", tag);
        } else {
            log::debug!("[menagerie] registered variant '{}'", tag);
        }
        replaced
    }

    /// Register `V` under [`Variant::TAG`].
    pub fn register_variant<V: Variant>(&mut self) -> bool {
        self.register(V::TAG, || Box::new(V::default()) as Box<dyn Animal>)
    }

    pub fn lookup(&self, tag: &str) -> Option<Factory> {
        self.factories.get(tag).copied()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.factories.contains_key(tag)
    }

    /// Produce an empty instance of the variant registered under `tag`.
    pub fn instantiate(&self, tag: &str) -> Result<Box<dyn Animal>, CodecError> {
        let factory = self
            .lookup(tag)
            .ok_or_else(|| CodecError::UnregisteredVariant(tag.to_string()))?;
        Ok(factory())
    }

    /// Registered tags (sorted for determinism).
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.factories.keys().cloned().collect();
        tags.sort();
        tags
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for VariantRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Process-wide registry
// ---------------------------------------------------------------------------

static GLOBAL_REGISTRY: OnceLock<VariantRegistry> = OnceLock::new();

/// Install `registry` as the process-wide registry.
///
/// Write-once: fails if a registry was already installed, including the
/// built-in one installed implicitly by [`global`].
pub fn install_global(registry: VariantRegistry) -> Result<&'static VariantRegistry, RegistryError> {
    GLOBAL_REGISTRY
        .set(registry)
        .map_err(|_| RegistryError::AlreadyInstalled)?;
    Ok(global())
}

/// Process-wide registry (installs [`VariantRegistry::builtin`] on first use).
pub fn global() -> &'static VariantRegistry {
    GLOBAL_REGISTRY.get_or_init(VariantRegistry::builtin)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
