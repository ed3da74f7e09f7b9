use std::borrow::Cow;

use crate::cursor::Writer;
use crate::error::{len_u32, Result};
use crate::reader::CHUNK_HEADER_SIZE;

/// One chunk ready to be written: tag plus fully serialized payload.
pub struct OutputChunk<'a> {
    pub magic: [u8; 4],
    pub data: Cow<'a, [u8]>,
}

impl<'a> OutputChunk<'a> {
    pub fn owned(magic: [u8; 4], data: Vec<u8>) -> Self {
        Self {
            magic,
            data: Cow::Owned(data),
        }
    }

    pub fn borrowed(magic: [u8; 4], data: &'a [u8]) -> Self {
        Self {
            magic,
            data: Cow::Borrowed(data),
        }
    }
}

/// Concatenate chunks into a complete bank.
///
/// The tag is written as four raw bytes, followed by the payload length and
/// the payload itself. The whole file is built in memory; nothing is written
/// anywhere until this returns.
pub fn assemble_bank(chunks: &[OutputChunk<'_>]) -> Result<Vec<u8>> {
    let total: usize = chunks
        .iter()
        .map(|c| CHUNK_HEADER_SIZE + c.data.len())
        .sum();
    let mut w = Writer::with_capacity(total);
    for chunk in chunks {
        w.write_magic(&chunk.magic);
        w.write_u32(len_u32(chunk.data.len(), "chunk payload")?);
        w.write_bytes(&chunk.data);
    }
    Ok(w.into_bytes())
}
