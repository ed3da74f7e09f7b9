//! Header probe for embedded sub-files.
//!
//! Sub-files are RIFF/WAVE containers. The probe reads the `fmt ` chunk and
//! locates the `data` chunk; it never decodes audio.

use serde::Serialize;

use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::options::DecodeOptions;

const RIFF: [u8; 4] = *b"RIFF";
const WAVE: [u8; 4] = *b"WAVE";
const FMT: [u8; 4] = *b"fmt ";
const DATA: [u8; 4] = *b"data";

/// Format details of one embedded sub-file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WemInfo {
    /// Size field of the RIFF header.
    pub riff_size: u32,
    pub format_tag: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub avg_bytes_per_sec: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    /// Byte offset of the audio data within the sub-file.
    pub data_offset: usize,
    /// Length of the audio data.
    pub data_len: usize,
}

impl WemInfo {
    /// Read the RIFF header of `bytes`.
    ///
    /// Chunks other than `fmt ` and `data` are skipped by their declared size.
    /// With [`DecodeOptions::pad_odd_data_chunk`] an odd `data` length is
    /// read as one byte longer.
    pub fn probe(bytes: &[u8], options: &DecodeOptions) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        expect_magic(&mut c, RIFF)?;
        let riff_size = c.read_u32()?;
        expect_magic(&mut c, WAVE)?;

        let mut format = None;
        loop {
            if c.is_empty() {
                return Err(Error::ChunkNotFound {
                    magic: if format.is_none() { FMT } else { DATA },
                });
            }
            let magic = c.read_magic()?;
            let size = c.read_u32()? as usize;
            match magic {
                FMT => {
                    let body = c.read_bytes(size)?;
                    let mut fc = Cursor::new(body);
                    format = Some((
                        fc.read_u16()?,
                        fc.read_u16()?,
                        fc.read_u32()?,
                        fc.read_u32()?,
                        fc.read_u16()?,
                        fc.read_u16()?,
                    ));
                }
                DATA => {
                    let (format_tag, channels, sample_rate, avg_bytes_per_sec, block_align, bits) =
                        format.ok_or(Error::ChunkNotFound { magic: FMT })?;
                    let data_len = if options.pad_odd_data_chunk && size % 2 == 1 {
                        size + 1
                    } else {
                        size
                    };
                    let data_offset = c.position();
                    c.read_bytes(data_len)?;
                    return Ok(Self {
                        riff_size,
                        format_tag,
                        channels,
                        sample_rate,
                        avg_bytes_per_sec,
                        block_align,
                        bits_per_sample: bits,
                        data_offset,
                        data_len,
                    });
                }
                other => {
                    tracing::trace!(
                        magic = %String::from_utf8_lossy(&other),
                        size,
                        "skipping sub-file chunk"
                    );
                    c.skip(size)?;
                }
            }
        }
    }

    /// Approximate duration in milliseconds, when the header allows it.
    pub fn duration_ms(&self) -> Option<u64> {
        if self.avg_bytes_per_sec == 0 {
            return None;
        }
        Some(self.data_len as u64 * 1000 / self.avg_bytes_per_sec as u64)
    }
}

fn expect_magic(c: &mut Cursor<'_>, expected: [u8; 4]) -> Result<()> {
    let found = c.read_magic()?;
    if found != expected {
        return Err(Error::InvalidMagic { expected, found });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cursor::Writer;

    /// A minimal RIFF/WAVE sub-file with an extra chunk before `data`.
    pub(crate) fn sample_wem(data_len: u32, payload: &[u8]) -> Vec<u8> {
        let mut w = Writer::new();
        w.write_magic(b"RIFF");
        w.write_u32(0);
        w.write_magic(b"WAVE");
        w.write_magic(b"fmt ");
        w.write_u32(16);
        w.write_u16(0xffff);
        w.write_u16(2);
        w.write_u32(48000);
        w.write_u32(24000);
        w.write_u16(0);
        w.write_u16(0);
        w.write_magic(b"cue ");
        w.write_u32(4);
        w.write_u32(0);
        w.write_magic(b"data");
        w.write_u32(data_len);
        w.write_bytes(payload);
        let riff_size = (w.position() - 8) as u32;
        w.patch_u32(4, riff_size);
        w.into_bytes()
    }

    #[test]
    fn probe_reads_format_and_data_range() {
        let bytes = sample_wem(4, &[1, 2, 3, 4]);
        let info = WemInfo::probe(&bytes, &DecodeOptions::default()).unwrap();
        assert_eq!(info.format_tag, 0xffff);
        assert_eq!(info.channels, 2);
        assert_eq!(info.sample_rate, 48000);
        assert_eq!(info.data_offset, 12 + 24 + 12 + 8);
        assert_eq!(info.data_len, 4);
        assert_eq!(info.riff_size as usize, bytes.len() - 8);
    }

    #[test]
    fn odd_data_length_needs_the_flag() {
        let bytes = sample_wem(3, &[1, 2, 3, 0]);
        let plain = WemInfo::probe(&bytes, &DecodeOptions::default()).unwrap();
        assert_eq!(plain.data_len, 3);

        let padded = DecodeOptions {
            pad_odd_data_chunk: true,
            ..DecodeOptions::default()
        };
        assert_eq!(WemInfo::probe(&bytes, &padded).unwrap().data_len, 4);

        // Without the pad byte present the padded read runs out of input.
        let short = sample_wem(3, &[1, 2, 3]);
        assert!(matches!(
            WemInfo::probe(&short, &padded),
            Err(Error::TruncatedInput { .. })
        ));
    }

    #[test]
    fn wrong_magic() {
        let mut bytes = sample_wem(0, &[]);
        bytes[8..12].copy_from_slice(b"AVI ");
        assert!(matches!(
            WemInfo::probe(&bytes, &DecodeOptions::default()),
            Err(Error::InvalidMagic { expected, .. }) if expected == *b"WAVE"
        ));
    }

    #[test]
    fn missing_data_chunk() {
        let bytes = sample_wem(0, &[]);
        let truncated = &bytes[..bytes.len() - 8];
        assert!(matches!(
            WemInfo::probe(truncated, &DecodeOptions::default()),
            Err(Error::ChunkNotFound { magic }) if magic == *b"data"
        ));
    }
}
