// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-memory FIFO channel of envelopes.

use std::collections::VecDeque;

use crate::animal::Animal;
use crate::envelope::{Decoder, Encoder};
use crate::error::CodecError;
use crate::registry::VariantRegistry;

/// Writer/reader pair over a shared byte buffer.
///
/// `send` appends an envelope at the back, `recv` consumes one from the
/// front, so values come out in the order they went in. Single owner, no
/// internal synchronization.
pub struct Channel<'r> {
    registry: &'r VariantRegistry,
    buffer: VecDeque<u8>,
    sent: u64,
    received: u64,
}

impl<'r> Channel<'r> {
    pub fn new(registry: &'r VariantRegistry) -> Self {
        Self {
            registry,
            buffer: VecDeque::new(),
            sent: 0,
            received: 0,
        }
    }

    /// Channel pre-filled with raw envelope bytes (e.g. read from disk).
    pub fn with_bytes(registry: &'r VariantRegistry, bytes: Vec<u8>) -> Self {
        Self {
            registry,
            buffer: VecDeque::from(bytes),
            sent: 0,
            received: 0,
        }
    }

    /// Encode `animal` at the back of the stream.
    pub fn send(&mut self, animal: &dyn Animal) -> Result<usize, CodecError> {
        let written = Encoder::new(self.registry, &mut self.buffer).encode(animal)?;
        self.sent += 1;
        Ok(written)
    }

    /// Decode the animal at the front of the stream.
    ///
    /// Returns [`CodecError::EndOfStream`] when nothing is pending. After any
    /// other error the channel contents are unspecified and should be
    /// dropped.
    pub fn recv(&mut self) -> Result<Box<dyn Animal>, CodecError> {
        let animal = Decoder::new(self.registry, &mut self.buffer).decode()?;
        self.received += 1;
        Ok(animal)
    }

    /// Append raw bytes at the back of the stream without validation.
    pub fn extend_raw(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Bytes not yet consumed by `recv`.
    pub fn pending_bytes(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Number of successful `send` calls.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Number of successful `recv` calls.
    pub fn received(&self) -> u64 {
        self.received
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Drain the pending bytes into a contiguous vector.
    pub fn into_bytes(self) -> Vec<u8> {
        Vec::from(self.buffer)
    }
}
