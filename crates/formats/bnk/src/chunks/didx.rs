use serde::Serialize;

use crate::cursor::{Cursor, Writer};
use crate::error::{Error, Result};

/// Size of one `DIDX` descriptor.
pub const DESCRIPTOR_SIZE: usize = 12;

/// Location of one embedded sub-file inside the `DATA` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DidxEntry {
    pub id: u32,
    pub offset: u32,
    pub size: u32,
}

/// Sub-file index (`DIDX`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Didx {
    pub entries: Vec<DidxEntry>,
}

impl Didx {
    pub fn parse(chunk_data: &[u8]) -> Result<Self> {
        if chunk_data.len() % DESCRIPTOR_SIZE != 0 {
            return Err(Error::Parse {
                context: "DIDX",
                message: format!(
                    "payload length {} is not a multiple of {DESCRIPTOR_SIZE}",
                    chunk_data.len()
                ),
            });
        }
        let mut c = Cursor::new(chunk_data);
        let mut entries = Vec::with_capacity(chunk_data.len() / DESCRIPTOR_SIZE);
        while !c.is_empty() {
            entries.push(DidxEntry {
                id: c.read_u32()?,
                offset: c.read_u32()?,
                size: c.read_u32()?,
            });
        }
        Ok(Self { entries })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        write_descriptors(self.entries.iter().map(|e| (e.id, e.offset, e.size)))
    }
}

/// Encode `(id, offset, size)` triples as a `DIDX` payload.
pub(crate) fn write_descriptors(triples: impl Iterator<Item = (u32, u32, u32)>) -> Vec<u8> {
    let mut w = Writer::new();
    for (id, offset, size) in triples {
        w.write_u32(id);
        w.write_u32(offset);
        w.write_u32(size);
    }
    w.into_bytes()
}
