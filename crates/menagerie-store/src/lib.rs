// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Menagerie Kennel
//!
//! Persists encoded animals in an embedded key-value store.
//!
//! # Features
//!
//! - **SQLite Backend** -- Single-file bucketed byte store with lock timeout
//! - **Memory Backend** -- In-process store for tests
//! - **Per-kind Buckets** -- One bucket per registered variant, keyed by name
//!
//! # Architecture
//!
//! ```text
//! Kennel
//! +-- VariantRegistry  (envelope encode/decode)
//! +-- KvStore          (SQLite or in-memory backend)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use menagerie::{Dog, VariantRegistry};
//! use menagerie_store::{Config, Kennel};
//!
//! let registry = VariantRegistry::builtin();
//! let config = Config::builder().db_path("animal.db").build();
//! let kennel = Kennel::open(&config, &registry)?;
//!
//! kennel.save(&Dog::new("Snoopy"))?;
//! let snoopy = kennel.load("Dog", "Snoopy")?;
//! ```

pub mod config;
pub mod kennel;
pub mod sqlite;
pub mod store;

pub use config::{Config, ConfigBuilder};
pub use kennel::Kennel;
pub use sqlite::SqliteStore;
pub use store::{KvStore, MemoryStore};
