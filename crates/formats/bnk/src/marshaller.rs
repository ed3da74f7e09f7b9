//! Owner of the embedded sub-files once a bank has been loaded.
//!
//! The `DIDX` table and the `DATA` blob are split into one buffer per
//! sub-file. Replacing a sub-file re-derives every offset with the packer's
//! alignment rule; the concatenated blob is rebuilt lazily and memoized.

use std::cell::OnceCell;

use crate::chunks::{write_descriptors, DataChunk, Didx};
use crate::error::{len_u32, Error, Result};

/// One embedded sub-file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubFile {
    pub id: u32,
    pub offset: u32,
    pub data: Vec<u8>,
}

impl SubFile {
    pub fn size(&self) -> u32 {
        // Sizes are validated against u32 on every insertion.
        self.data.len() as u32
    }
}

/// Lookup and replacement of embedded sub-files by id.
///
/// Not `Sync`: the blob memo is a [`OnceCell`].
#[derive(Debug, Clone)]
pub struct SubFileMarshaller {
    files: Vec<SubFile>,
    /// Concatenated blob; empty after an edit until next requested.
    blob: OnceCell<Vec<u8>>,
}

impl SubFileMarshaller {
    /// Split `data` according to `didx`.
    ///
    /// The original blob seeds the memo, so an unedited bank re-emits its
    /// `DATA` payload exactly even if its gaps are not the ones the alignment
    /// rule would produce.
    pub fn from_chunks(didx: &Didx, data: &DataChunk) -> Result<Self> {
        let blob = &data.data;
        let mut files = Vec::with_capacity(didx.entries.len());
        for entry in &didx.entries {
            let start = entry.offset as usize;
            let slice = start
                .checked_add(entry.size as usize)
                .and_then(|end| blob.get(start..end))
                .ok_or(Error::SubFileOutOfBounds {
                    id: entry.id,
                    offset: entry.offset,
                    size: entry.size,
                    blob_len: blob.len(),
                })?;
            files.push(SubFile {
                id: entry.id,
                offset: entry.offset,
                data: slice.to_vec(),
            });
        }
        Ok(Self {
            files,
            blob: OnceCell::from(blob.clone()),
        })
    }

    /// Build from `(id, bytes)` pairs laid out with the alignment rule.
    pub fn from_files(files: impl IntoIterator<Item = (u32, Vec<u8>)>) -> Result<Self> {
        let mut m = Self {
            files: files
                .into_iter()
                .map(|(id, data)| SubFile {
                    id,
                    offset: 0,
                    data,
                })
                .collect(),
            blob: OnceCell::new(),
        };
        m.relayout()?;
        Ok(m)
    }

    pub fn lookup(&self, id: u32) -> Option<&[u8]> {
        self.files
            .iter()
            .find(|f| f.id == id)
            .map(|f| f.data.as_slice())
    }

    /// Overwrite the bytes of sub-file `id` and re-derive all offsets.
    ///
    /// The id keeps its position. On error nothing changes.
    pub fn replace(&mut self, id: u32, data: Vec<u8>) -> Result<()> {
        let index = self
            .files
            .iter()
            .position(|f| f.id == id)
            .ok_or(Error::UnknownSubFileId { id })?;
        len_u32(data.len(), "sub-file")?;

        let sizes = self.files.iter().enumerate().map(|(i, f)| {
            if i == index {
                data.len()
            } else {
                f.data.len()
            }
        });
        let offsets = aligned_offsets(sizes)?;

        self.files[index].data = data;
        for (file, offset) in self.files.iter_mut().zip(offsets) {
            file.offset = offset;
        }
        self.blob.take();
        tracing::debug!(id, sub_files = self.files.len(), "replaced sub-file");
        Ok(())
    }

    /// Current `(id, offset, size)` triples in index order.
    pub fn descriptor_table(&self) -> Vec<(u32, u32, u32)> {
        self.files
            .iter()
            .map(|f| (f.id, f.offset, f.size()))
            .collect()
    }

    /// The descriptor table encoded as a `DIDX` payload.
    pub fn didx_payload(&self) -> Vec<u8> {
        write_descriptors(self.files.iter().map(|f| (f.id, f.offset, f.size())))
    }

    /// Every sub-file followed by the zero gap up to the next offset.
    pub fn concatenated_blob(&self) -> &[u8] {
        self.blob.get_or_init(|| {
            let mut out = Vec::new();
            for (i, file) in self.files.iter().enumerate() {
                out.extend_from_slice(&file.data);
                if let Some(next) = self.files.get(i + 1) {
                    let end = file.offset as usize + file.data.len();
                    out.resize(out.len() + (next.offset as usize).saturating_sub(end), 0);
                }
            }
            out
        })
    }

    /// Whether `id` holds identical bytes here and in `other`. `None` if
    /// either side lacks the id.
    pub fn same_content(&self, other: &SubFileMarshaller, id: u32) -> Option<bool> {
        Some(self.lookup(id)? == other.lookup(id)?)
    }

    /// Ids present in both marshallers whose bytes differ, in this
    /// marshaller's order.
    pub fn differing_ids(&self, other: &SubFileMarshaller) -> Vec<u32> {
        self.files
            .iter()
            .filter(|f| other.lookup(f.id).is_some_and(|o| o != f.data.as_slice()))
            .map(|f| f.id)
            .collect()
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.files.iter().map(|f| f.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SubFile> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn relayout(&mut self) -> Result<()> {
        let offsets = aligned_offsets(self.files.iter().map(|f| f.data.len()))?;
        for (file, offset) in self.files.iter_mut().zip(offsets) {
            file.offset = offset;
        }
        self.blob.take();
        Ok(())
    }
}

/// Offsets the bank packer assigns to sub-files of the given sizes.
///
/// After each file the running end is rounded up to a multiple of 4; an end
/// already on a multiple of 4 still moves forward, to the boundary after next.
/// An end of 0 stays 0.
pub fn aligned_offsets(sizes: impl IntoIterator<Item = usize>) -> Result<Vec<u32>> {
    let mut offsets = Vec::new();
    let mut cur: u64 = 0;
    for size in sizes {
        offsets.push(u32::try_from(cur).map_err(|_| Error::LengthOverflow {
            context: "sub-file offset",
            len: cur as usize,
            max: u32::MAX.into(),
        })?);
        cur += size as u64;
        cur = align(cur);
    }
    Ok(offsets)
}

fn align(end: u64) -> u64 {
    match end {
        0 => 0,
        e if e % 4 == 0 => e + 8,
        e => e - e % 4 + 4,
    }
}
