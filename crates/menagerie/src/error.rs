// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for envelope encoding and registry setup.

use std::io;
use thiserror::Error;

/// Errors produced while encoding or decoding animal envelopes.
///
/// After any error other than [`CodecError::EndOfStream`] the read position
/// of the underlying stream is unspecified; callers must discard the stream.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The envelope tag (or the value's kind) has no registered factory.
    #[error("variant '{0}' is not registered")]
    UnregisteredVariant(String),

    /// No bytes remain at an envelope boundary.
    #[error("end of stream")]
    EndOfStream,

    /// The stream ended in the middle of an envelope.
    #[error("truncated envelope: stream ended while reading {context}")]
    Truncated { context: &'static str },

    /// The envelope or its payload does not have the expected shape.
    #[error("malformed envelope: {0}")]
    Malformed(String),

    /// The underlying reader or writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CodecError {
    /// Returns true if this is a clean end-of-stream rather than a failure.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, CodecError::EndOfStream)
    }
}

/// Errors produced while installing the process-wide registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// `install_global` was called after the global registry was set.
    #[error("global variant registry is already installed")]
    AlreadyInstalled,
}
