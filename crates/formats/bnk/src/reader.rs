use crate::cursor::Cursor;
use crate::error::{Error, Result};

/// Size of a chunk header: 4-byte tag + u32 payload length.
pub const CHUNK_HEADER_SIZE: usize = 8;

/// A single chunk entry in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkEntry {
    /// 4-byte ASCII magic identifying the chunk type.
    pub magic: [u8; 4],
    /// Absolute byte offset of the chunk header (magic field) in the file.
    pub offset: usize,
    /// Size of the chunk's payload (excluding the 8-byte header).
    pub size: usize,
}

impl ChunkEntry {
    /// Absolute offset where the payload begins (after magic + size fields).
    pub fn data_offset(&self) -> usize {
        self.offset + CHUNK_HEADER_SIZE
    }

    /// Absolute offset one past the end of the payload.
    pub fn end_offset(&self) -> usize {
        self.data_offset() + self.size
    }

    /// Magic as a string (for display).
    pub fn magic_str(&self) -> &str {
        magic_str(&self.magic)
    }
}

/// Render a 4-byte tag for display, falling back to `????` for non-UTF-8 tags.
pub fn magic_str(magic: &[u8; 4]) -> &str {
    std::str::from_utf8(magic).unwrap_or("????")
}

/// Index of all top-level chunks in a bank.
///
/// This is Layer 1: it only knows chunk boundaries. It does not parse any
/// chunk internals and never rejects a tag, so unknown chunks survive as
/// plain byte ranges.
pub struct ChunkIndex {
    /// Ordered list of chunks as they appear in the file.
    chunks: Vec<ChunkEntry>,
}

impl ChunkIndex {
    /// Frame the whole file into chunks.
    ///
    /// Banks have no outer envelope: the file is a flat run of
    /// `tag, length, payload` records. Framing advances strictly by
    /// `8 + length`, so a payload is never partially consumed.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);

        let mut chunks = Vec::new();
        while !cursor.is_empty() {
            let chunk_offset = cursor.position();
            if cursor.remaining() < CHUNK_HEADER_SIZE {
                return Err(Error::TruncatedInput {
                    offset: chunk_offset,
                    need: CHUNK_HEADER_SIZE,
                    have: cursor.remaining(),
                });
            }

            let chunk_magic = cursor.read_magic()?;
            let chunk_size = cursor.read_u32()? as usize;
            // Payload must be fully present before the entry is trusted.
            cursor.skip(chunk_size)?;

            chunks.push(ChunkEntry {
                magic: chunk_magic,
                offset: chunk_offset,
                size: chunk_size,
            });
        }

        Ok(Self { chunks })
    }

    /// All chunks in file order.
    pub fn chunks(&self) -> &[ChunkEntry] {
        &self.chunks
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Find a chunk by its 4-byte magic. Returns the first match.
    pub fn find(&self, magic: &[u8; 4]) -> Option<&ChunkEntry> {
        self.chunks.iter().find(|c| &c.magic == magic)
    }

    /// Get the raw payload bytes for an entry from the file data.
    pub fn payload<'a>(&self, data: &'a [u8], entry: &ChunkEntry) -> Result<&'a [u8]> {
        let start = entry.data_offset();
        let end = entry.end_offset();
        if end > data.len() {
            return Err(Error::TruncatedInput {
                offset: start,
                need: entry.size,
                have: data.len().saturating_sub(start),
            });
        }
        Ok(&data[start..end])
    }
}
