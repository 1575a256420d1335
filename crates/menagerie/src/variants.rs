// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built-in animal variants.

use serde::{Deserialize, Serialize};

use crate::animal::{decode_record, encode_variant, Animal, AnimalBase, Variant};
use crate::error::CodecError;

// ---------------------------------------------------------------------------
// Cat
// ---------------------------------------------------------------------------

/// A cat. Speaks, but will not fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Cat {
    pub base: AnimalBase,
}

impl Cat {
    /// Create a newly born cat.
    pub fn new(name: &str) -> Self {
        let mut cat = Cat::default();
        cat.birth(name);
        cat
    }
}

impl Animal for Cat {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn base(&self) -> &AnimalBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AnimalBase {
        &mut self.base
    }

    fn birth(&mut self, name: &str) {
        self.base.birth(name, Self::TAG);
    }

    fn speak(&self) -> String {
        self.base.speak("Meow")
    }

    fn fetch(&self, _what: &str, _place: &str) -> String {
        format!("Yeah...Right, {}'s don't fetch!", Self::TAG)
    }

    fn encode_fields(&self) -> Result<Vec<u8>, CodecError> {
        encode_variant(self)
    }

    fn decode_fields(&mut self, payload: &[u8]) -> Result<(), CodecError> {
        *self = decode_record(Self::TAG, payload)?;
        Ok(())
    }
}

impl Variant for Cat {
    const TAG: &'static str = "Cat";
}

// ---------------------------------------------------------------------------
// Dog
// ---------------------------------------------------------------------------

/// A dog. Speaks and happily fetches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dog {
    pub base: AnimalBase,
}

impl Dog {
    /// Create a newly born dog.
    pub fn new(name: &str) -> Self {
        let mut dog = Dog::default();
        dog.birth(name);
        dog
    }
}

impl Animal for Dog {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn base(&self) -> &AnimalBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AnimalBase {
        &mut self.base
    }

    fn birth(&mut self, name: &str) {
        self.base.birth(name, Self::TAG);
    }

    fn speak(&self) -> String {
        self.base.speak("Woof")
    }

    fn fetch(&self, what: &str, place: &str) -> String {
        format!(
            "Your favorite {} {}, Happily fetches {} from the {}",
            Self::TAG,
            self.base.name,
            what,
            place
        )
    }

    fn encode_fields(&self) -> Result<Vec<u8>, CodecError> {
        encode_variant(self)
    }

    fn decode_fields(&mut self, payload: &[u8]) -> Result<(), CodecError> {
        *self = decode_record(Self::TAG, payload)?;
        Ok(())
    }
}

impl Variant for Dog {
    const TAG: &'static str = "Dog";
}
