use serde::Serialize;

use crate::cursor::{Cursor, Writer};
use crate::error::Result;

use super::sound::PlaybackSettings;

/// Kind 2: a single sound effect or voice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sfx {
    pub id: u32,
    pub unknown: [u8; 4],
    pub storage: SfxStorage,
    /// Id of the audio file (the sub-file id when embedded).
    pub audio_file_id: u32,
    pub source_id: u32,
    /// 0 for a plain sound, 1 for a voice.
    pub sound_type: u8,
    pub settings: PlaybackSettings,
}

/// Where the audio of an [`Sfx`] lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SfxStorage {
    /// Inside this bank's `DATA` chunk.
    Embedded { offset: u32, length: u32 },
    /// In a loose file next to the bank.
    Streamed,
    /// Streamed, with the first part prefetched from the bank.
    PrefetchStreamed,
    Raw(u32),
}

impl SfxStorage {
    fn from_u32(v: u32, c: &mut Cursor<'_>) -> Result<Self> {
        Ok(match v {
            0 => Self::Embedded {
                offset: c.read_u32()?,
                length: c.read_u32()?,
            },
            1 => Self::Streamed,
            2 => Self::PrefetchStreamed,
            other => Self::Raw(other),
        })
    }

    pub fn as_u32(&self) -> u32 {
        match *self {
            Self::Embedded { .. } => 0,
            Self::Streamed => 1,
            Self::PrefetchStreamed => 2,
            Self::Raw(v) => v,
        }
    }
}

impl Sfx {
    pub fn read(c: &mut Cursor<'_>) -> Result<Self> {
        let id = c.read_u32()?;
        let unknown = c.read_array()?;
        let storage_kind = c.read_u32()?;
        let audio_file_id = c.read_u32()?;
        let source_id = c.read_u32()?;
        let storage = SfxStorage::from_u32(storage_kind, c)?;
        Ok(Self {
            id,
            unknown,
            storage,
            audio_file_id,
            source_id,
            sound_type: c.read_u8()?,
            settings: PlaybackSettings::read(c)?,
        })
    }

    pub fn write(&self, w: &mut Writer) -> Result<()> {
        w.write_u32(self.id);
        w.write_bytes(&self.unknown);
        w.write_u32(self.storage.as_u32());
        w.write_u32(self.audio_file_id);
        w.write_u32(self.source_id);
        if let SfxStorage::Embedded { offset, length } = self.storage {
            w.write_u32(offset);
            w.write_u32(length);
        }
        w.write_u8(self.sound_type);
        self.settings.write(w)
    }
}
