// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Polymorphic animals with tagged binary serialization.
//!
//! Values are encoded through the abstract [`Animal`] trait and decoded back
//! into `Box<dyn Animal>` with their concrete variant intact.
//!
//! # Features
//!
//! - **Capability contract**: `birth`, `speak`, `fetch` on every variant
//! - **Variant registry**: tag -> zero-value factory, optional write-once global
//! - **Envelope codec**: versioned tag + JSON payload, little-endian framing
//! - **Channel**: FIFO writer/reader pair over an in-memory buffer
//!
//! # Architecture
//!
//! ```text
//!   Cat / Dog  --as &dyn Animal-->  Encoder  --> [envelope][envelope]...
//!                                                      |
//!   Box<dyn Animal>  <--factory + fields--  Decoder <--+
//!                           ^
//!                    VariantRegistry
//! ```
//!
//! # Example
//!
//! ```
//! use menagerie::{Animal, Cat, Channel, Dog, VariantRegistry};
//!
//! let registry = VariantRegistry::builtin();
//! let mut channel = Channel::new(&registry);
//!
//! channel.send(&Cat::new("Garfield")).unwrap();
//! channel.send(&Dog::new("Snoopy")).unwrap();
//!
//! let first = channel.recv().unwrap();
//! assert_eq!(first.speak(), "Garfield says Meow");
//! let second = channel.recv().unwrap();
//! assert!(second.fetch("ball", "yard").contains("ball"));
//! ```

pub mod animal;
pub mod envelope;
pub mod error;
pub mod registry;
pub mod stream;
pub mod variants;

pub use animal::{Animal, AnimalBase, Variant};
pub use envelope::{
    from_bytes, inspect, to_bytes, Decoder, Encoder, Envelope, EnvelopeHeader, ENVELOPE_VERSION,
    MAX_PAYLOAD_LEN, MAX_TAG_LEN,
};
pub use error::{CodecError, RegistryError};
pub use registry::{global, install_global, Factory, VariantRegistry};
pub use stream::Channel;
pub use variants::{Cat, Dog};
