// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tagged envelope codec.
//!
//! # Envelope Format
//!
//! ```text
//! +---------------------------------------------------------+
//! | version (1) | tag_len (2) | tag (var, utf-8)            |
//! | payload_len (4) | payload (var, JSON object)            |
//! +---------------------------------------------------------+
//! ```
//!
//! All integers are little-endian. The tag names the concrete variant and
//! selects the factory used on decode. The payload is the variant record
//! serialized as JSON, so it describes itself field by field.
//!
//! Envelopes are written back to back. A decoder reading from the same
//! stream yields values in the order they were encoded.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::animal::Animal;
use crate::error::CodecError;
use crate::registry::VariantRegistry;

/// Current envelope format version.
pub const ENVELOPE_VERSION: u8 = 1;

/// Longest accepted variant tag, in bytes.
pub const MAX_TAG_LEN: usize = 255;

/// Largest accepted payload, in bytes.
pub const MAX_PAYLOAD_LEN: usize = 1 << 20;

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Fixed part of an envelope, preceding the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeHeader {
    pub version: u8,
    pub tag: String,
    pub payload_len: u32,
}

impl EnvelopeHeader {
    /// Size of the header on the wire.
    pub fn encoded_len(&self) -> usize {
        1 + 2 + self.tag.len() + 4
    }
}

/// A raw envelope: header plus undecoded payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub header: EnvelopeHeader,
    pub payload: Vec<u8>,
}

impl Envelope {
    /// Total size of the envelope on the wire.
    pub fn encoded_len(&self) -> usize {
        self.header.encoded_len() + self.payload.len()
    }

    /// Read one envelope without resolving its variant.
    ///
    /// Returns `Ok(None)` when the reader is exhausted at an envelope
    /// boundary.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Option<Self>, CodecError> {
        let mut version = [0u8; 1];
        if !read_first(reader, &mut version)? {
            return Ok(None);
        }
        let version = version[0];
        if version != ENVELOPE_VERSION {
            return Err(CodecError::Malformed(format!(
                "unsupported envelope version {} (expected {})",
                version, ENVELOPE_VERSION
            )));
        }

        let tag_len = reader
            .read_u16::<LittleEndian>()
            .map_err(truncated("tag length"))? as usize;
        if tag_len == 0 || tag_len > MAX_TAG_LEN {
            return Err(CodecError::Malformed(format!("invalid tag length {}", tag_len)));
        }
        let mut tag = vec![0u8; tag_len];
        reader.read_exact(&mut tag).map_err(truncated("tag"))?;
        let tag = String::from_utf8(tag)
            .map_err(|_| CodecError::Malformed("tag is not valid UTF-8".to_string()))?;

        let payload_len = reader
            .read_u32::<LittleEndian>()
            .map_err(truncated("payload length"))?;
        if payload_len as usize > MAX_PAYLOAD_LEN {
            return Err(CodecError::Malformed(format!(
                "payload length {} exceeds limit {}",
                payload_len, MAX_PAYLOAD_LEN
            )));
        }
        let mut payload = vec![0u8; payload_len as usize];
        reader.read_exact(&mut payload).map_err(truncated("payload"))?;

        Ok(Some(Envelope {
            header: EnvelopeHeader {
                version,
                tag,
                payload_len,
            },
            payload,
        }))
    }

    /// Write the envelope.
    ///
    /// Fails with `InvalidInput`, writing nothing, if the tag is empty or
    /// longer than [`MAX_TAG_LEN`], or if the payload does not match
    /// `payload_len` or exceeds [`MAX_PAYLOAD_LEN`].
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let tag_len = self.header.tag.len();
        if tag_len == 0 || tag_len > MAX_TAG_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid tag length {}", tag_len),
            ));
        }
        if self.payload.len() > MAX_PAYLOAD_LEN
            || self.header.payload_len as usize != self.payload.len()
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "payload of {} bytes does not fit header payload_len {}",
                    self.payload.len(),
                    self.header.payload_len
                ),
            ));
        }

        w.write_u8(self.header.version)?;
        w.write_u16::<LittleEndian>(tag_len as u16)?;
        w.write_all(self.header.tag.as_bytes())?;
        w.write_u32::<LittleEndian>(self.header.payload_len)?;
        w.write_all(&self.payload)?;
        Ok(())
    }
}

/// Parse a single envelope from `bytes` without decoding its payload.
pub fn inspect(bytes: &[u8]) -> Result<Envelope, CodecError> {
    let mut cursor = bytes;
    let envelope = Envelope::read_from(&mut cursor)?.ok_or(CodecError::EndOfStream)?;
    if !cursor.is_empty() {
        return Err(CodecError::Malformed(format!(
            "{} trailing bytes after envelope",
            cursor.len()
        )));
    }
    Ok(envelope)
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

/// Writes animals as envelopes to an underlying writer.
pub struct Encoder<'r, W: Write> {
    registry: &'r VariantRegistry,
    writer: W,
}

impl<'r, W: Write> Encoder<'r, W> {
    pub fn new(registry: &'r VariantRegistry, writer: W) -> Self {
        Self { registry, writer }
    }

    /// Encode `animal` as one envelope.
    ///
    /// The variant is taken from `animal.tag()`, the concrete type's tag.
    /// Fails without writing anything if that tag is not registered. Returns
    /// the number of bytes written.
    pub fn encode(&mut self, animal: &dyn Animal) -> Result<usize, CodecError> {
        let tag = animal.tag();
        if !self.registry.contains(tag) {
            return Err(CodecError::UnregisteredVariant(tag.to_string()));
        }
        if tag.len() > MAX_TAG_LEN {
            return Err(CodecError::Malformed(format!(
                "tag '{}' longer than {} bytes",
                tag, MAX_TAG_LEN
            )));
        }

        let payload = animal.encode_fields()?;
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(CodecError::Malformed(format!(
                "payload length {} exceeds limit {}",
                payload.len(),
                MAX_PAYLOAD_LEN
            )));
        }

        let envelope = Envelope {
            header: EnvelopeHeader {
                version: ENVELOPE_VERSION,
                tag: tag.to_string(),
                payload_len: payload.len() as u32,
            },
            payload,
        };

        // Stage the frame so a failing writer never sees half a header.
        let mut frame = Vec::with_capacity(envelope.encoded_len());
        envelope.write_to(&mut frame)?;
        self.writer.write_all(&frame)?;

        log::debug!(
            "[menagerie] encoded {} '{}' ({} bytes)",
            tag,
            animal.name(),
            frame.len()
        );
        Ok(frame.len())
    }

    pub fn flush(&mut self) -> Result<(), CodecError> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Reads envelopes from an underlying reader and rebuilds the animals.
pub struct Decoder<'r, R: Read> {
    registry: &'r VariantRegistry,
    reader: R,
}

impl<'r, R: Read> Decoder<'r, R> {
    pub fn new(registry: &'r VariantRegistry, reader: R) -> Self {
        Self { registry, reader }
    }

    /// Decode the next envelope.
    ///
    /// The whole envelope is consumed before the tag is resolved, so an
    /// unregistered tag leaves the stream positioned at the next envelope.
    pub fn decode(&mut self) -> Result<Box<dyn Animal>, CodecError> {
        let envelope = Envelope::read_from(&mut self.reader)?.ok_or(CodecError::EndOfStream)?;
        let tag = envelope.header.tag.as_str();

        let mut animal = self.registry.instantiate(tag)?;
        animal.decode_fields(&envelope.payload)?;
        if animal.base().kind != tag {
            return Err(CodecError::Malformed(format!(
                "payload kind '{}' does not match envelope tag '{}'",
                animal.base().kind,
                tag
            )));
        }

        log::debug!("[menagerie] decoded {} '{}'", tag, animal.name());
        Ok(animal)
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

// ---------------------------------------------------------------------------
// One-shot helpers
// ---------------------------------------------------------------------------

/// Encode a single animal into a fresh byte vector.
pub fn to_bytes(registry: &VariantRegistry, animal: &dyn Animal) -> Result<Vec<u8>, CodecError> {
    let mut encoder = Encoder::new(registry, Vec::new());
    encoder.encode(animal)?;
    Ok(encoder.into_inner())
}

/// Decode exactly one animal from `bytes`.
///
/// Trailing bytes after the envelope are rejected.
pub fn from_bytes(registry: &VariantRegistry, bytes: &[u8]) -> Result<Box<dyn Animal>, CodecError> {
    let mut cursor = bytes;
    let animal = Decoder::new(registry, &mut cursor).decode()?;
    if !cursor.is_empty() {
        return Err(CodecError::Malformed(format!(
            "{} trailing bytes after envelope",
            cursor.len()
        )));
    }
    Ok(animal)
}

// ---------------------------------------------------------------------------
// Read helpers
// ---------------------------------------------------------------------------

/// Read the first byte of an envelope, distinguishing a clean end of stream.
fn read_first<R: Read>(reader: &mut R, buf: &mut [u8; 1]) -> Result<bool, CodecError> {
    loop {
        match reader.read(buf) {
            Ok(0) => return Ok(false),
            Ok(_) => return Ok(true),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CodecError::Io(e)),
        }
    }
}

fn truncated(context: &'static str) -> impl FnOnce(io::Error) -> CodecError {
    move |e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            CodecError::Truncated { context }
        } else {
            CodecError::Io(e)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animal::{decode_record, encode_variant, AnimalBase, Variant};
    use crate::variants::{Cat, Dog};
    use serde::{Deserialize, Serialize};

    /// A variant that is never registered in the built-in registry.
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Parrot {
        base: AnimalBase,
    }

    impl Animal for Parrot {
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
            self.base.speak("Polly wants a cracker")
        }
        fn fetch(&self, what: &str, _place: &str) -> String {
            format!("{} repeats: {}", self.base.name, what)
        }
        fn encode_fields(&self) -> Result<Vec<u8>, CodecError> {
            encode_variant(self)
        }
        fn decode_fields(&mut self, payload: &[u8]) -> Result<(), CodecError> {
            *self = decode_record(Self::TAG, payload)?;
            Ok(())
        }
    }

    impl Variant for Parrot {
        const TAG: &'static str = "Parrot";
    }

    fn raw_envelope(tag: &str, payload: &[u8]) -> Vec<u8> {
        let envelope = Envelope {
            header: EnvelopeHeader {
                version: ENVELOPE_VERSION,
                tag: tag.to_string(),
                payload_len: payload.len() as u32,
            },
            payload: payload.to_vec(),
        };
        let mut out = Vec::new();
        envelope.write_to(&mut out).unwrap();
        out
    }

    #[test]
    fn header_layout() {
        let reg = VariantRegistry::builtin();
        let bytes = to_bytes(&reg, &Cat::new("Tom")).unwrap();

        assert_eq!(bytes[0], ENVELOPE_VERSION);
        assert_eq!(u16::from_le_bytes([bytes[1], bytes[2]]), 3);
        assert_eq!(&bytes[3..6], b"Cat");
        let payload_len = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]) as usize;
        assert_eq!(bytes.len(), 10 + payload_len);

        let envelope = inspect(&bytes).unwrap();
        assert_eq!(envelope.header.tag, "Cat");
        assert_eq!(envelope.encoded_len(), bytes.len());
        let json: serde_json::Value = serde_json::from_slice(&envelope.payload).unwrap();
        assert_eq!(json["base"]["name"], "Tom");
    }

    #[test]
    fn roundtrip_preserves_variant_and_fields() {
        let reg = VariantRegistry::builtin();
        let mut dog = Dog::new("Snoopy");
        dog.set_favorite_toy("supper dish");

        let bytes = to_bytes(&reg, &dog).unwrap();
        let decoded = from_bytes(&reg, &bytes).unwrap();

        assert_eq!(decoded.kind(), "Dog");
        assert_eq!(decoded.name(), "Snoopy");
        assert_eq!(decoded.favorite_toy(), "supper dish");
        assert_eq!(decoded.speak(), dog.speak());
        assert_eq!(decoded.fetch("ball", "yard"), dog.fetch("ball", "yard"));
    }

    #[test]
    fn encode_unregistered_variant_writes_nothing() {
        let reg = VariantRegistry::builtin();
        let mut parrot = Parrot::default();
        parrot.birth("Polly");

        let mut encoder = Encoder::new(&reg, Vec::new());
        let err = encoder.encode(&parrot).unwrap_err();
        assert!(matches!(err, CodecError::UnregisteredVariant(ref t) if t == "Parrot"));
        assert!(encoder.get_ref().is_empty());
    }

    #[test]
    fn unborn_animal_roundtrips_as_its_type() {
        let reg = VariantRegistry::builtin();
        let bytes = to_bytes(&reg, &Dog::default()).unwrap();
        assert_eq!(inspect(&bytes).unwrap().header.tag, "Dog");

        let decoded = from_bytes(&reg, &bytes).unwrap();
        assert_eq!(decoded.tag(), "Dog");
        assert!(decoded.name().is_empty());
        assert_eq!(decoded.speak(), Dog::default().speak());
    }

    #[test]
    fn overwritten_kind_does_not_change_variant() {
        let reg = VariantRegistry::builtin();
        let mut dog = Dog::new("Snoopy");
        dog.base_mut().kind = "Cat".to_string();

        let bytes = to_bytes(&reg, &dog).unwrap();
        assert_eq!(inspect(&bytes).unwrap().header.tag, "Dog");

        let decoded = from_bytes(&reg, &bytes).unwrap();
        assert_eq!(decoded.kind(), "Dog");
        assert_eq!(decoded.speak(), "Snoopy says Woof");
        assert_eq!(decoded.fetch("ball", "yard"), dog.fetch("ball", "yard"));
    }

    #[test]
    fn write_to_rejects_inconsistent_header() {
        let long_tag = Envelope {
            header: EnvelopeHeader {
                version: ENVELOPE_VERSION,
                tag: "x".repeat(70_000),
                payload_len: 0,
            },
            payload: Vec::new(),
        };
        let mut out = Vec::new();
        let err = long_tag.write_to(&mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(out.is_empty());

        let short_payload = Envelope {
            header: EnvelopeHeader {
                version: ENVELOPE_VERSION,
                tag: "Cat".to_string(),
                payload_len: 10,
            },
            payload: b"{}".to_vec(),
        };
        let err = short_payload.write_to(&mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(out.is_empty());
    }

    #[test]
    fn decode_unregistered_tag_fails() {
        let mut reg = VariantRegistry::builtin();
        reg.register_variant::<Parrot>();
        let mut parrot = Parrot::default();
        parrot.birth("Polly");
        let bytes = to_bytes(&reg, &parrot).unwrap();

        let builtin = VariantRegistry::builtin();
        let err = from_bytes(&builtin, &bytes).unwrap_err();
        assert!(matches!(err, CodecError::UnregisteredVariant(ref t) if t == "Parrot"));
    }

    #[test]
    fn unregistered_tag_consumes_whole_envelope() {
        let reg = VariantRegistry::builtin();
        let mut stream = raw_envelope("Fish", br#"{"base":{"kind":"Fish","name":"Nemo"}}"#);
        stream.extend(to_bytes(&reg, &Cat::new("Tom")).unwrap());

        let mut decoder = Decoder::new(&reg, stream.as_slice());
        assert!(matches!(
            decoder.decode().unwrap_err(),
            CodecError::UnregisteredVariant(_)
        ));
        assert_eq!(decoder.decode().unwrap().name(), "Tom");
        assert!(decoder.decode().unwrap_err().is_end_of_stream());
    }

    #[test]
    fn every_prefix_is_truncated() {
        let reg = VariantRegistry::builtin();
        let bytes = to_bytes(&reg, &Dog::new("Rex")).unwrap();

        assert!(matches!(
            from_bytes(&reg, &[]).unwrap_err(),
            CodecError::EndOfStream
        ));
        for cut in 1..bytes.len() {
            let err = from_bytes(&reg, &bytes[..cut]).unwrap_err();
            assert!(
                matches!(err, CodecError::Truncated { .. }),
                "prefix of {} bytes gave {:?}",
                cut,
                err
            );
        }
    }

    #[test]
    fn bad_version_is_malformed() {
        let reg = VariantRegistry::builtin();
        let mut bytes = to_bytes(&reg, &Cat::new("Tom")).unwrap();
        bytes[0] = 9;
        assert!(matches!(
            from_bytes(&reg, &bytes).unwrap_err(),
            CodecError::Malformed(_)
        ));
    }

    #[test]
    fn invalid_tag_bytes_are_malformed() {
        let reg = VariantRegistry::builtin();
        let mut bytes = vec![ENVELOPE_VERSION, 2, 0, 0xFF, 0xFE];
        bytes.extend_from_slice(&0u32.to_le_bytes());
        assert!(matches!(
            from_bytes(&reg, &bytes).unwrap_err(),
            CodecError::Malformed(_)
        ));

        let empty_tag = vec![ENVELOPE_VERSION, 0, 0];
        assert!(matches!(
            from_bytes(&reg, &empty_tag).unwrap_err(),
            CodecError::Malformed(_)
        ));
    }

    #[test]
    fn oversized_payload_is_rejected_before_allocation() {
        let reg = VariantRegistry::builtin();
        let mut bytes = vec![ENVELOPE_VERSION, 3, 0];
        bytes.extend_from_slice(b"Cat");
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            from_bytes(&reg, &bytes).unwrap_err(),
            CodecError::Malformed(_)
        ));
    }

    #[test]
    fn payload_shape_mismatch_is_malformed() {
        let reg = VariantRegistry::builtin();
        let bytes = raw_envelope("Cat", br#"{"whiskers":12}"#);
        assert!(matches!(
            from_bytes(&reg, &bytes).unwrap_err(),
            CodecError::Malformed(_)
        ));
    }

    #[test]
    fn payload_kind_must_match_tag() {
        let reg = VariantRegistry::builtin();
        let bytes = raw_envelope(
            "Cat",
            br#"{"base":{"kind":"Dog","name":"Odie","favorite_toy":""}}"#,
        );
        let err = from_bytes(&reg, &bytes).unwrap_err();
        assert!(matches!(err, CodecError::Malformed(ref m) if m.contains("does not match")));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let reg = VariantRegistry::builtin();
        let mut bytes = to_bytes(&reg, &Cat::new("Tom")).unwrap();
        bytes.push(0);
        assert!(matches!(
            from_bytes(&reg, &bytes).unwrap_err(),
            CodecError::Malformed(_)
        ));
        assert!(matches!(inspect(&bytes).unwrap_err(), CodecError::Malformed(_)));
    }
}
