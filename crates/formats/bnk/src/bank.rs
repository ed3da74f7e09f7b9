use crate::chunks::{Bkhd, Chunk, Stid, Stmg};
use crate::error::{Error, Result};
use crate::hierarchy::Hirc;
use crate::marshaller::SubFileMarshaller;
use crate::options::DecodeOptions;
use crate::progress::{Logged, Progress, Step};
use crate::reader::ChunkIndex;
use crate::writer::{assemble_bank, OutputChunk};

/// A decoded bank: every chunk in file order plus the sub-file marshaller.
///
/// Decoding is eager; a bank is small enough to hold fully in memory and has
/// to be rewritten as a whole anyway. After loading, the marshaller is the
/// only source of truth for the `DIDX` and `DATA` payloads.
#[derive(Debug, Clone)]
pub struct Bank {
    chunks: Vec<Chunk>,
    /// Built when the bank has both an index and a data chunk.
    sub_files: Option<SubFileMarshaller>,
    /// Position of the first `DIDX` chunk in `chunks`.
    index_pos: Option<usize>,
    /// Position of the first `DATA` chunk in `chunks`.
    data_pos: Option<usize>,
}

impl Bank {
    /// Decode a bank with default options, logging progress through `tracing`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::parse_with(data, &DecodeOptions::default(), &mut Logged)
    }

    /// Decode a bank.
    ///
    /// An unknown hierarchy object kind fails the whole decode; its offset is
    /// reported relative to the start of the file.
    pub fn parse_with(
        data: &[u8],
        options: &DecodeOptions,
        progress: &mut dyn Progress,
    ) -> Result<Self> {
        let index = ChunkIndex::parse(data)?;

        let mut chunks = Vec::with_capacity(index.len());
        for (i, entry) in index.chunks().iter().enumerate() {
            let payload = index.payload(data, entry)?;
            let chunk =
                Chunk::decode(entry.magic, payload, options, progress).map_err(|e| match e {
                    Error::UnknownObjectKind { offset, kind } => Error::UnknownObjectKind {
                        offset: entry.data_offset() + offset,
                        kind,
                    },
                    other => other,
                })?;
            progress.step(&Step::ChunkDecoded {
                index: i,
                magic: entry.magic,
                offset: entry.offset,
                length: entry.size,
                opaque: chunk.is_opaque(),
            });
            chunks.push(chunk);
        }

        let index_pos = chunks.iter().position(|c| matches!(c, Chunk::Index(_)));
        let data_pos = chunks.iter().position(|c| matches!(c, Chunk::Data(_)));
        let sub_files = match (index_pos, data_pos) {
            (Some(i), Some(d)) => match (&chunks[i], &chunks[d]) {
                (Chunk::Index(didx), Chunk::Data(blob)) => {
                    Some(SubFileMarshaller::from_chunks(didx, blob)?)
                }
                _ => None,
            },
            _ => None,
        };

        Ok(Self {
            chunks,
            sub_files,
            index_pos,
            data_pos,
        })
    }

    /// Encode the bank, logging progress through `tracing`.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.to_bytes_with(&mut Logged)
    }

    /// Encode the bank. Chunks keep their order; the first `DIDX`/`DATA`
    /// pair takes its payload from the marshaller.
    pub fn to_bytes_with(&self, progress: &mut dyn Progress) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.chunks.len());
        for (i, chunk) in self.chunks.iter().enumerate() {
            let magic = chunk.magic();
            let output = match &self.sub_files {
                Some(m) if Some(i) == self.index_pos => OutputChunk::owned(magic, m.didx_payload()),
                Some(m) if Some(i) == self.data_pos => {
                    OutputChunk::borrowed(magic, m.concatenated_blob())
                }
                _ => OutputChunk {
                    magic,
                    data: chunk.payload(progress)?,
                },
            };
            progress.step(&Step::ChunkEncoded {
                index: i,
                magic,
                length: output.data.len(),
            });
            out.push(output);
        }
        assemble_bank(&out)
    }

    /// All chunks in file order, as decoded.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Bank header (BKHD).
    pub fn header(&self) -> Option<&Bkhd> {
        self.chunks.iter().find_map(|c| match c {
            Chunk::Header(h) => Some(h),
            _ => None,
        })
    }

    /// Object hierarchy (HIRC), unless it was kept opaque.
    pub fn hierarchy(&self) -> Option<&Hirc> {
        self.chunks.iter().find_map(|c| match c {
            Chunk::Hierarchy(h) => Some(h),
            _ => None,
        })
    }

    pub fn hierarchy_mut(&mut self) -> Option<&mut Hirc> {
        self.chunks.iter_mut().find_map(|c| match c {
            Chunk::Hierarchy(h) => Some(h),
            _ => None,
        })
    }

    /// Bank name table (STID).
    pub fn strings(&self) -> Option<&Stid> {
        self.chunks.iter().find_map(|c| match c {
            Chunk::Strings(s) => Some(s),
            _ => None,
        })
    }

    /// Global settings (STMG).
    pub fn globals(&self) -> Option<&Stmg> {
        self.chunks.iter().find_map(|c| match c {
            Chunk::Globals(g) => Some(g),
            _ => None,
        })
    }

    pub fn sub_files(&self) -> Option<&SubFileMarshaller> {
        self.sub_files.as_ref()
    }

    /// Bytes of embedded sub-file `id`.
    pub fn lookup(&self, id: u32) -> Option<&[u8]> {
        self.sub_files.as_ref()?.lookup(id)
    }

    /// Replace embedded sub-file `id`.
    ///
    /// Embedded offsets recorded in hierarchy objects are left as they are.
    pub fn replace(&mut self, id: u32, data: Vec<u8>) -> Result<()> {
        match &mut self.sub_files {
            Some(m) => m.replace(id, data),
            None => Err(Error::UnknownSubFileId { id }),
        }
    }
}
