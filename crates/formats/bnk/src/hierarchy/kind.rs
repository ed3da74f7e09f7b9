use serde::Serialize;

/// Hierarchy object discriminator (first byte of every `HIRC` record).
///
/// The set is closed: a byte outside it cannot be skipped safely because the
/// record length only follows the discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[repr(u8)]
pub enum ObjectKind {
    Settings = 1,
    Sfx = 2,
    EventAction = 3,
    Event = 4,
    SequenceContainer = 5,
    SwitchContainer = 6,
    ActorMixer = 7,
    AudioBus = 8,
    BlendContainer = 9,
    MusicSegment = 10,
    MusicTrack = 11,
    MusicSwitchContainer = 12,
    MusicPlaylistContainer = 13,
    Attenuation = 14,
    DialogueEvent = 15,
    MotionBus = 16,
    MotionFx = 17,
    Effect = 18,
    // 19 is not used by any bank version we read.
    AuxBus = 20,
}

impl ObjectKind {
    /// Every known kind in discriminator order.
    pub const ALL: [ObjectKind; 19] = [
        Self::Settings,
        Self::Sfx,
        Self::EventAction,
        Self::Event,
        Self::SequenceContainer,
        Self::SwitchContainer,
        Self::ActorMixer,
        Self::AudioBus,
        Self::BlendContainer,
        Self::MusicSegment,
        Self::MusicTrack,
        Self::MusicSwitchContainer,
        Self::MusicPlaylistContainer,
        Self::Attenuation,
        Self::DialogueEvent,
        Self::MotionBus,
        Self::MotionFx,
        Self::Effect,
        Self::AuxBus,
    ];

    /// Decode a discriminator byte.
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(Self::Settings),
            2 => Some(Self::Sfx),
            3 => Some(Self::EventAction),
            4 => Some(Self::Event),
            5 => Some(Self::SequenceContainer),
            6 => Some(Self::SwitchContainer),
            7 => Some(Self::ActorMixer),
            8 => Some(Self::AudioBus),
            9 => Some(Self::BlendContainer),
            10 => Some(Self::MusicSegment),
            11 => Some(Self::MusicTrack),
            12 => Some(Self::MusicSwitchContainer),
            13 => Some(Self::MusicPlaylistContainer),
            14 => Some(Self::Attenuation),
            15 => Some(Self::DialogueEvent),
            16 => Some(Self::MotionBus),
            17 => Some(Self::MotionFx),
            18 => Some(Self::Effect),
            20 => Some(Self::AuxBus),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Human-readable name (for display).
    pub fn name(self) -> &'static str {
        match self {
            Self::Settings => "settings",
            Self::Sfx => "sfx",
            Self::EventAction => "event action",
            Self::Event => "event",
            Self::SequenceContainer => "sequence container",
            Self::SwitchContainer => "switch container",
            Self::ActorMixer => "actor-mixer",
            Self::AudioBus => "audio bus",
            Self::BlendContainer => "blend container",
            Self::MusicSegment => "music segment",
            Self::MusicTrack => "music track",
            Self::MusicSwitchContainer => "music switch container",
            Self::MusicPlaylistContainer => "music playlist container",
            Self::Attenuation => "attenuation",
            Self::DialogueEvent => "dialogue event",
            Self::MotionBus => "motion bus",
            Self::MotionFx => "motion fx",
            Self::Effect => "effect",
            Self::AuxBus => "aux bus",
        }
    }
}
