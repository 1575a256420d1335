// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Kennel configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Kennel configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database path (SQLite file)
    pub db_path: String,

    /// How long to wait on a locked database before failing, in milliseconds
    pub open_timeout_ms: u64,

    /// Create one bucket per registered variant when the kennel opens
    pub create_missing_buckets: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: "animal.db".to_string(),
            open_timeout_ms: 1000,
            create_missing_buckets: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load configuration from a JSON file
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Lock timeout as a `Duration`
    pub fn open_timeout(&self) -> Duration {
        Duration::from_millis(self.open_timeout_ms)
    }
}

/// Config builder for fluent API
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    db_path: Option<String>,
    open_timeout_ms: Option<u64>,
    create_missing_buckets: Option<bool>,
}

impl ConfigBuilder {
    /// Set database path
    pub fn db_path(mut self, path: impl Into<String>) -> Self {
        self.db_path = Some(path.into());
        self
    }

    /// Set lock timeout in milliseconds
    pub fn open_timeout_ms(mut self, ms: u64) -> Self {
        self.open_timeout_ms = Some(ms);
        self
    }

    /// Create per-variant buckets on open (default: true)
    pub fn create_missing_buckets(mut self, create: bool) -> Self {
        self.create_missing_buckets = Some(create);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Config {
        let defaults = Config::default();

        Config {
            db_path: self.db_path.unwrap_or(defaults.db_path),
            open_timeout_ms: self.open_timeout_ms.unwrap_or(defaults.open_timeout_ms),
            create_missing_buckets: self
                .create_missing_buckets
                .unwrap_or(defaults.create_missing_buckets),
        }
    }
}
