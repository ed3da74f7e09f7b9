use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("truncated input at offset {offset:#x} (need {need} bytes, have {have})")]
    TruncatedInput {
        offset: usize,
        need: usize,
        have: usize,
    },

    #[error("unknown hierarchy object kind {kind} at offset {offset:#x}")]
    UnknownObjectKind { offset: usize, kind: u8 },

    #[error("no embedded sub-file with id {id}")]
    UnknownSubFileId { id: u32 },

    #[error("sub-file {id} (offset {offset:#x}, size {size}) lies outside the {blob_len}-byte data chunk")]
    SubFileOutOfBounds {
        id: u32,
        offset: u32,
        size: u32,
        blob_len: usize,
    },

    #[error("{context}: {len} does not fit its length field (max {max})")]
    LengthOverflow {
        context: &'static str,
        len: usize,
        max: u64,
    },

    #[error("invalid magic: expected {expected:?}, found {found:?}")]
    InvalidMagic { expected: [u8; 4], found: [u8; 4] },

    #[error("chunk {magic:?} not found")]
    ChunkNotFound { magic: [u8; 4] },

    #[error("string at offset {offset:#x} is not valid UTF-8: {source}")]
    InvalidString {
        offset: usize,
        source: std::string::FromUtf8Error,
    },

    #[error("{context}: {message}")]
    Parse { context: &'static str, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Convert a buffer length or item count into a u32 length field.
pub(crate) fn len_u32(len: usize, context: &'static str) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::LengthOverflow {
        context,
        len,
        max: u32::MAX.into(),
    })
}

/// Convert an item count into a u16 count field.
pub(crate) fn len_u16(len: usize, context: &'static str) -> Result<u16> {
    u16::try_from(len).map_err(|_| Error::LengthOverflow {
        context,
        len,
        max: u16::MAX.into(),
    })
}

/// Convert an item count into a u8 count field.
pub(crate) fn len_u8(len: usize, context: &'static str) -> Result<u8> {
    u8::try_from(len).map_err(|_| Error::LengthOverflow {
        context,
        len,
        max: u8::MAX.into(),
    })
}
