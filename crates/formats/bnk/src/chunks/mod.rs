//! Typed chunk payloads and per-identity dispatch.

mod bkhd;
mod data;
mod didx;
mod stid;
mod stmg;

use std::borrow::Cow;

use serde::Serialize;

pub use bkhd::Bkhd;
pub use data::DataChunk;
pub(crate) use didx::write_descriptors;
pub use didx::{DESCRIPTOR_SIZE, Didx, DidxEntry};
pub use stid::{BankName, Stid};
pub use stmg::{GameParameter, GlobalStateGroup, StateTransition, Stmg, SwitchGroup, SwitchPoint};

use crate::error::{Error, Result};
use crate::hierarchy::Hirc;
use crate::options::DecodeOptions;
use crate::progress::{Progress, Step};

pub const BKHD: [u8; 4] = *b"BKHD";
pub const DIDX: [u8; 4] = *b"DIDX";
pub const DATA: [u8; 4] = *b"DATA";
pub const HIRC: [u8; 4] = *b"HIRC";
pub const STID: [u8; 4] = *b"STID";
pub const STMG: [u8; 4] = *b"STMG";

/// A chunk whose payload is carried as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpaqueChunk {
    #[serde(serialize_with = "serialize_magic")]
    pub magic: [u8; 4],
    #[serde(skip)]
    pub data: Vec<u8>,
}

/// One top-level chunk of a bank.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "chunk")]
pub enum Chunk {
    Header(Bkhd),
    Index(Didx),
    Data(DataChunk),
    Hierarchy(Hirc),
    Strings(Stid),
    Globals(Stmg),
    Opaque(OpaqueChunk),
}

impl Chunk {
    /// Decode `payload` according to `magic`.
    ///
    /// Unknown tags, and `HIRC` when hierarchy decoding is off, become
    /// [`Chunk::Opaque`]. `STID` and `STMG` also fall back to opaque when
    /// their layout does not cover the payload exactly; every other error is
    /// returned.
    pub fn decode(
        magic: [u8; 4],
        payload: &[u8],
        options: &DecodeOptions,
        progress: &mut dyn Progress,
    ) -> Result<Self> {
        let opaque = || {
            Chunk::Opaque(OpaqueChunk {
                magic,
                data: payload.to_vec(),
            })
        };
        Ok(match &magic {
            b"BKHD" => Chunk::Header(Bkhd::parse(payload)?),
            b"DIDX" => Chunk::Index(Didx::parse(payload)?),
            b"DATA" => Chunk::Data(DataChunk::parse(payload)),
            b"HIRC" if options.decode_hierarchy => {
                Chunk::Hierarchy(Hirc::parse(payload, progress)?)
            }
            b"STID" if options.typed_metadata => {
                best_effort(magic, payload, Stid::parse, Stid::to_bytes, progress)
                    .map_or_else(opaque, Chunk::Strings)
            }
            b"STMG" if options.typed_metadata => {
                best_effort(magic, payload, Stmg::parse, Stmg::to_bytes, progress)
                    .map_or_else(opaque, Chunk::Globals)
            }
            _ => opaque(),
        })
    }

    pub fn magic(&self) -> [u8; 4] {
        match self {
            Chunk::Header(_) => BKHD,
            Chunk::Index(_) => DIDX,
            Chunk::Data(_) => DATA,
            Chunk::Hierarchy(_) => HIRC,
            Chunk::Strings(_) => STID,
            Chunk::Globals(_) => STMG,
            Chunk::Opaque(o) => o.magic,
        }
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, Chunk::Opaque(_))
    }

    /// Encode the payload of this chunk.
    pub fn payload(&self, progress: &mut dyn Progress) -> Result<Cow<'_, [u8]>> {
        Ok(match self {
            Chunk::Header(h) => Cow::Owned(h.to_bytes()),
            Chunk::Index(d) => Cow::Owned(d.to_bytes()),
            Chunk::Data(d) => Cow::Borrowed(&d.data),
            Chunk::Hierarchy(h) => Cow::Owned(h.to_bytes(progress)?),
            Chunk::Strings(s) => Cow::Owned(s.to_bytes()?),
            Chunk::Globals(s) => Cow::Owned(s.to_bytes()?),
            Chunk::Opaque(o) => Cow::Borrowed(&o.data),
        })
    }
}

/// Parse with `parse` and keep the result only if it re-encodes to exactly
/// `payload`.
fn best_effort<T>(
    magic: [u8; 4],
    payload: &[u8],
    parse: fn(&[u8]) -> Result<T>,
    encode: fn(&T) -> Result<Vec<u8>>,
    progress: &mut dyn Progress,
) -> Option<T> {
    let outcome = parse(payload).and_then(|value| {
        let bytes = encode(&value)?;
        if bytes == payload {
            Ok(value)
        } else {
            Err(Error::Parse {
                context: "chunk layout",
                message: format!(
                    "re-encoded payload differs ({} bytes, expected {})",
                    bytes.len(),
                    payload.len()
                ),
            })
        }
    });
    match outcome {
        Ok(value) => Some(value),
        Err(e) => {
            progress.step(&Step::ChunkFallback {
                magic,
                reason: e.to_string(),
            });
            None
        }
    }
}

fn serialize_magic<S: serde::Serializer>(
    magic: &[u8; 4],
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&String::from_utf8_lossy(magic))
}
