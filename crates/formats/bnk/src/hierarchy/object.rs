use serde::Serialize;

use crate::cursor::{Cursor, Writer};
use crate::error::Result;

use super::action::{Event, EventAction};
use super::bus::AudioBus;
use super::kind::ObjectKind;
use super::music::{MusicPlaylist, MusicSegment, MusicSwitch};
use super::settings::Settings;
use super::sfx::Sfx;

/// A decoded hierarchy object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum HircObject {
    Settings(Settings),
    Sfx(Sfx),
    EventAction(EventAction),
    Event(Event),
    AudioBus(AudioBus),
    MusicSegment(MusicSegment),
    MusicSwitchContainer(MusicSwitch),
    MusicPlaylistContainer(MusicPlaylist),
    /// A kind whose body is only known to start with its id.
    Untyped { kind: ObjectKind, id: u32 },
    /// The body was shorter than the kind's schema. Kept byte-for-byte.
    Undecoded {
        kind: ObjectKind,
        #[serde(skip)]
        body: Vec<u8>,
    },
}

impl HircObject {
    /// Decode the known fields of a `kind` body. The caller keeps whatever
    /// the cursor does not consume.
    pub(crate) fn read(kind: ObjectKind, c: &mut Cursor<'_>) -> Result<Self> {
        Ok(match kind {
            ObjectKind::Settings => Self::Settings(Settings::read(c)?),
            ObjectKind::Sfx => Self::Sfx(Sfx::read(c)?),
            ObjectKind::EventAction => Self::EventAction(EventAction::read(c)?),
            ObjectKind::Event => Self::Event(Event::read(c)?),
            ObjectKind::AudioBus => Self::AudioBus(AudioBus::read(c)?),
            ObjectKind::MusicSegment => Self::MusicSegment(MusicSegment::read(c)?),
            ObjectKind::MusicSwitchContainer => Self::MusicSwitchContainer(MusicSwitch::read(c)?),
            ObjectKind::MusicPlaylistContainer => {
                Self::MusicPlaylistContainer(MusicPlaylist::read(c)?)
            }
            ObjectKind::SequenceContainer
            | ObjectKind::SwitchContainer
            | ObjectKind::ActorMixer
            | ObjectKind::BlendContainer
            | ObjectKind::MusicTrack
            | ObjectKind::Attenuation
            | ObjectKind::DialogueEvent
            | ObjectKind::MotionBus
            | ObjectKind::MotionFx
            | ObjectKind::Effect
            | ObjectKind::AuxBus => Self::Untyped {
                kind,
                id: c.read_u32()?,
            },
        })
    }

    pub(crate) fn write(&self, w: &mut Writer) -> Result<()> {
        match self {
            Self::Settings(o) => o.write(w),
            Self::Sfx(o) => o.write(w),
            Self::EventAction(o) => o.write(w),
            Self::Event(o) => o.write(w),
            Self::AudioBus(o) => o.write(w),
            Self::MusicSegment(o) => o.write(w),
            Self::MusicSwitchContainer(o) => o.write(w),
            Self::MusicPlaylistContainer(o) => o.write(w),
            Self::Untyped { id, .. } => {
                w.write_u32(*id);
                Ok(())
            }
            Self::Undecoded { body, .. } => {
                w.write_bytes(body);
                Ok(())
            }
        }
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Settings(_) => ObjectKind::Settings,
            Self::Sfx(_) => ObjectKind::Sfx,
            Self::EventAction(_) => ObjectKind::EventAction,
            Self::Event(_) => ObjectKind::Event,
            Self::AudioBus(_) => ObjectKind::AudioBus,
            Self::MusicSegment(_) => ObjectKind::MusicSegment,
            Self::MusicSwitchContainer(_) => ObjectKind::MusicSwitchContainer,
            Self::MusicPlaylistContainer(_) => ObjectKind::MusicPlaylistContainer,
            Self::Untyped { kind, .. } | Self::Undecoded { kind, .. } => *kind,
        }
    }

    /// The object id, if the body was long enough to hold one.
    pub fn id(&self) -> Option<u32> {
        match self {
            Self::Settings(o) => Some(o.id),
            Self::Sfx(o) => Some(o.id),
            Self::EventAction(o) => Some(o.id),
            Self::Event(o) => Some(o.id),
            Self::AudioBus(o) => Some(o.id),
            Self::MusicSegment(o) => Some(o.id),
            Self::MusicSwitchContainer(o) => Some(o.id),
            Self::MusicPlaylistContainer(o) => Some(o.id),
            Self::Untyped { id, .. } => Some(*id),
            Self::Undecoded { body, .. } => body
                .get(..4)
                .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_only_kinds_read_four_bytes() {
        let body = [0x10, 0x20, 0x30, 0x40, 0xff, 0xee];
        let mut c = Cursor::new(&body);
        let obj = HircObject::read(ObjectKind::ActorMixer, &mut c).unwrap();
        assert_eq!(
            obj,
            HircObject::Untyped {
                kind: ObjectKind::ActorMixer,
                id: 0x4030_2010
            }
        );
        assert_eq!(c.remaining(), 2);
        assert_eq!(obj.kind(), ObjectKind::ActorMixer);
    }

    #[test]
    fn undecoded_id_needs_four_bytes() {
        let short = HircObject::Undecoded {
            kind: ObjectKind::Sfx,
            body: vec![1, 2],
        };
        assert_eq!(short.id(), None);
        let long = HircObject::Undecoded {
            kind: ObjectKind::Sfx,
            body: vec![1, 0, 0, 0, 9],
        };
        assert_eq!(long.id(), Some(1));
    }
}
