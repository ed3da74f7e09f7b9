//! Observability hook for decode and encode passes.
//!
//! Codecs report what they are doing through [`Progress::step`] at chunk and
//! hierarchy-object boundaries. They never print anything themselves.

use crate::hierarchy::ObjectKind;
use crate::reader::magic_str;

/// How a hierarchy object's decoded fields lined up with its declared length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFit {
    /// Known fields covered the body exactly.
    Exact,
    /// Known fields ended early; `unread` bytes were kept as the object's tail.
    Underrun { unread: usize },
    /// The schema ran past the declared body; the object was kept undecoded.
    Overrun,
    /// The decoded fields did not re-encode to the same bytes; the object was
    /// kept undecoded.
    Mismatch,
}

/// One reportable moment in a decode or encode pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A top-level chunk was decoded. `opaque` is set when its payload is
    /// carried as raw bytes.
    ChunkDecoded {
        index: usize,
        magic: [u8; 4],
        offset: usize,
        length: usize,
        opaque: bool,
    },
    /// A typed chunk did not match its schema and fell back to raw bytes.
    ChunkFallback { magic: [u8; 4], reason: String },
    /// A hierarchy object was decoded. `offset` is relative to the `HIRC`
    /// payload and points at the discriminator byte.
    ObjectDecoded {
        index: usize,
        kind: ObjectKind,
        offset: usize,
        length: u32,
        fit: BodyFit,
    },
    /// A hierarchy object was serialized.
    ObjectEncoded {
        index: usize,
        kind: ObjectKind,
        length: u32,
    },
    /// A top-level chunk was serialized.
    ChunkEncoded {
        index: usize,
        magic: [u8; 4],
        length: usize,
    },
}

/// Receiver for [`Step`]s.
pub trait Progress {
    fn step(&mut self, step: &Step);
}

impl<F: FnMut(&Step)> Progress for F {
    fn step(&mut self, step: &Step) {
        self(step)
    }
}

/// Discards every step.
pub struct Silent;

impl Progress for Silent {
    fn step(&mut self, _step: &Step) {}
}

/// Forwards steps to `tracing`: boundaries at `debug`, drift and fallbacks at `warn`.
pub struct Logged;

impl Progress for Logged {
    fn step(&mut self, step: &Step) {
        match step {
            Step::ChunkDecoded {
                index,
                magic,
                offset,
                length,
                opaque,
            } => tracing::debug!(
                index,
                magic = magic_str(magic),
                offset,
                length,
                opaque,
                "decoded chunk"
            ),
            Step::ChunkFallback { magic, reason } => tracing::warn!(
                magic = magic_str(magic),
                reason = reason.as_str(),
                "chunk kept as raw bytes"
            ),
            Step::ObjectDecoded {
                index,
                kind,
                offset,
                length,
                fit,
            } => match fit {
                BodyFit::Exact => {
                    tracing::debug!(index, kind = ?kind, offset, length, "decoded object")
                }
                BodyFit::Underrun { unread } => tracing::debug!(
                    index,
                    kind = ?kind,
                    offset,
                    length,
                    unread,
                    "decoded object with unparsed tail"
                ),
                BodyFit::Overrun => tracing::warn!(
                    index,
                    kind = ?kind,
                    offset,
                    length,
                    "object body shorter than its schema, kept undecoded"
                ),
                BodyFit::Mismatch => tracing::warn!(
                    index,
                    kind = ?kind,
                    offset,
                    length,
                    "object does not re-encode to its own bytes, kept undecoded"
                ),
            },
            Step::ObjectEncoded {
                index,
                kind,
                length,
            } => tracing::trace!(index, kind = ?kind, length, "encoded object"),
            Step::ChunkEncoded {
                index,
                magic,
                length,
            } => tracing::debug!(index, magic = magic_str(magic), length, "encoded chunk"),
        }
    }
}
