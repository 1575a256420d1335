// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The `Animal` capability contract and the shared base record.
//!
//! Every concrete variant holds an [`AnimalBase`] in a field named `base` and
//! forwards the shared behavior to it. The variant tag is a compile-time
//! constant ([`Variant::TAG`]) reported by [`Animal::tag`], so the serializer
//! never has to inspect runtime type names. `AnimalBase::kind` is a stored
//! copy of that tag; the encoder overwrites it with the real tag.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CodecError;

// ---------------------------------------------------------------------------
// AnimalBase
// ---------------------------------------------------------------------------

/// State shared by every animal variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnimalBase {
    /// Variant tag (e.g. "Cat", "Dog").
    pub kind: String,
    /// Given name ("Garfield", "Snoopy").
    pub name: String,
    /// Optional favorite toy, empty when unset.
    #[serde(default)]
    pub favorite_toy: String,
}

impl AnimalBase {
    /// Bring a new animal of `kind` into the world.
    ///
    /// Resets the favorite toy.
    pub fn birth(&mut self, name: &str, kind: &str) {
        self.name = name.to_string();
        self.favorite_toy.clear();
        self.kind = kind.to_string();
        log::info!("A {} named {} was born!", self.kind, self.name);
    }

    /// Generic speech helper used by the variants.
    pub fn speak(&self, sound: &str) -> String {
        format!("{} says {}", self.name, sound)
    }
}

// ---------------------------------------------------------------------------
// Animal
// ---------------------------------------------------------------------------

/// Capability contract implemented by every animal variant.
///
/// Code holding a `Box<dyn Animal>` can call [`speak`](Animal::speak) and
/// [`fetch`](Animal::fetch) without knowing the concrete type.
pub trait Animal: fmt::Debug {
    /// Tag of the concrete variant. Never taken from field data.
    fn tag(&self) -> &'static str;

    /// Shared base record.
    fn base(&self) -> &AnimalBase;

    /// Mutable access to the shared base record.
    fn base_mut(&mut self) -> &mut AnimalBase;

    /// (Re)initialize this animal with the given name.
    fn birth(&mut self, name: &str);

    /// What this animal says.
    fn speak(&self) -> String;

    /// Ask this animal to fetch `what` from `place`.
    fn fetch(&self, what: &str, place: &str) -> String;

    /// Serialize the variant's fields into an envelope payload.
    fn encode_fields(&self) -> Result<Vec<u8>, CodecError>;

    /// Replace this value's fields with those decoded from `payload`.
    fn decode_fields(&mut self, payload: &[u8]) -> Result<(), CodecError>;

    /// Variant tag, same as [`tag`](Animal::tag).
    fn kind(&self) -> &str {
        self.tag()
    }

    fn name(&self) -> &str {
        &self.base().name
    }

    fn favorite_toy(&self) -> &str {
        &self.base().favorite_toy
    }

    fn set_favorite_toy(&mut self, toy: &str) {
        self.base_mut().favorite_toy = toy.to_string();
    }
}

/// A concrete, registrable animal type.
pub trait Variant: Animal + Default + Serialize + DeserializeOwned + 'static {
    /// Stable tag written into every envelope of this variant.
    const TAG: &'static str;
}

// ---------------------------------------------------------------------------
// Payload helpers
// ---------------------------------------------------------------------------

/// Encode a variant record as a JSON payload.
pub fn encode_record<T: Serialize>(tag: &str, record: &T) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(record)
        .map_err(|e| CodecError::Malformed(format!("cannot encode {} payload: {}", tag, e)))
}

/// Encode a variant value, writing `V::TAG` into the payload's `kind`.
///
/// The stored `kind` may be empty (unborn value) or overwritten by the
/// caller; the payload always carries the tag of the concrete type.
pub fn encode_variant<V: Variant + Clone>(value: &V) -> Result<Vec<u8>, CodecError> {
    if value.base().kind == V::TAG {
        return encode_record(V::TAG, value);
    }
    let mut record = value.clone();
    record.base_mut().kind = V::TAG.to_string();
    encode_record(V::TAG, &record)
}

/// Decode a JSON payload into a variant record.
///
/// Any shape mismatch (missing field, unknown field, wrong type) is reported
/// as [`CodecError::Malformed`].
pub fn decode_record<T: DeserializeOwned>(tag: &str, payload: &[u8]) -> Result<T, CodecError> {
    serde_json::from_slice(payload)
        .map_err(|e| CodecError::Malformed(format!("invalid {} payload: {}", tag, e)))
}
