//! The playback settings record shared by sounds and music objects.
//!
//! The record is a run of flags, each of which gates an optional block that
//! follows it. The model keeps only the blocks: a flag is `true` on the wire
//! exactly when its `Option` is `Some`.

use serde::Serialize;

use crate::cursor::{Cursor, Writer};
use crate::error::Result;

use super::common::{
    read_effects, read_params, read_rtpcs, read_state_groups, write_effects, write_params,
    write_rtpcs, write_state_groups, EffectChain, Param, Rtpc, RtpcLayout, StateGroup,
};

/// Playback, routing and positioning settings of a sound-like object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSettings {
    pub override_parent: bool,
    pub effects: Option<EffectChain>,
    pub output_bus: u32,
    pub parent_id: u32,
    pub override_priority: bool,
    pub offset_priority_at_max_distance: bool,
    /// Values are 32-bit floats or integers depending on the type byte; kept raw.
    pub params: Vec<Param<u32>>,
    pub unknown: u8,
    pub positioning: Option<Positioning>,
    pub override_game_aux: bool,
    pub use_game_aux: bool,
    pub override_user_aux: bool,
    pub user_aux_buses: Option<[u32; 4]>,
    pub playback_limit: Option<PlaybackLimit>,
    pub limit_method: u8,
    pub virtual_voice_behavior: u8,
    pub override_limit: bool,
    pub override_virtual_voice: bool,
    pub state_groups: Vec<StateGroup>,
    pub rtpcs: Vec<Rtpc>,
}

/// Positioning block, keyed by its dimension byte.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Positioning {
    /// Dimension 0.
    TwoD { enable_panner: bool },
    /// Dimension 1.
    ThreeD {
        attenuation_id: u32,
        spatialization: bool,
        source: PositionSource,
    },
    /// Any other dimension byte; nothing follows it.
    Raw(u8),
}

/// Where a 3D-positioned object takes its emitter position from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum PositionSource {
    /// Source type 2.
    UserDefined {
        play_type: u32,
        looping: bool,
        transition_ms: u32,
        follow_orientation: bool,
    },
    /// Source type 3.
    GameDefined { update_per_frame: bool },
    /// Any other source type; nothing follows it.
    Raw(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlaybackLimit {
    pub priority_equal: u8,
    pub limit_reached: u8,
    pub max_instances: u16,
}

impl PlaybackSettings {
    pub fn read(c: &mut Cursor<'_>) -> Result<Self> {
        let override_parent = c.read_bool()?;
        let effects = read_effects(c)?;
        let output_bus = c.read_u32()?;
        let parent_id = c.read_u32()?;
        let override_priority = c.read_bool()?;
        let offset_priority_at_max_distance = c.read_bool()?;
        let params = read_params(c)?;
        let unknown = c.read_u8()?;

        let positioning = if c.read_bool()? {
            Some(Positioning::read(c)?)
        } else {
            None
        };

        let override_game_aux = c.read_bool()?;
        let use_game_aux = c.read_bool()?;
        let override_user_aux = c.read_bool()?;
        let user_aux_buses = if c.read_bool()? {
            Some([c.read_u32()?, c.read_u32()?, c.read_u32()?, c.read_u32()?])
        } else {
            None
        };

        let playback_limit = if c.read_bool()? {
            Some(PlaybackLimit {
                priority_equal: c.read_u8()?,
                limit_reached: c.read_u8()?,
                max_instances: c.read_u16()?,
            })
        } else {
            None
        };

        Ok(Self {
            override_parent,
            effects,
            output_bus,
            parent_id,
            override_priority,
            offset_priority_at_max_distance,
            params,
            unknown,
            positioning,
            override_game_aux,
            use_game_aux,
            override_user_aux,
            user_aux_buses,
            playback_limit,
            limit_method: c.read_u8()?,
            virtual_voice_behavior: c.read_u8()?,
            override_limit: c.read_bool()?,
            override_virtual_voice: c.read_bool()?,
            state_groups: read_state_groups(c)?,
            rtpcs: read_rtpcs(c, RtpcLayout::Sound)?,
        })
    }

    pub fn write(&self, w: &mut Writer) -> Result<()> {
        w.write_bool(self.override_parent);
        write_effects(w, self.effects.as_ref())?;
        w.write_u32(self.output_bus);
        w.write_u32(self.parent_id);
        w.write_bool(self.override_priority);
        w.write_bool(self.offset_priority_at_max_distance);
        write_params(w, &self.params)?;
        w.write_u8(self.unknown);

        w.write_bool(self.positioning.is_some());
        if let Some(positioning) = &self.positioning {
            positioning.write(w);
        }

        w.write_bool(self.override_game_aux);
        w.write_bool(self.use_game_aux);
        w.write_bool(self.override_user_aux);
        w.write_bool(self.user_aux_buses.is_some());
        for id in self.user_aux_buses.iter().flatten() {
            w.write_u32(*id);
        }

        w.write_bool(self.playback_limit.is_some());
        if let Some(limit) = &self.playback_limit {
            w.write_u8(limit.priority_equal);
            w.write_u8(limit.limit_reached);
            w.write_u16(limit.max_instances);
        }

        w.write_u8(self.limit_method);
        w.write_u8(self.virtual_voice_behavior);
        w.write_bool(self.override_limit);
        w.write_bool(self.override_virtual_voice);
        write_state_groups(w, &self.state_groups)?;
        write_rtpcs(w, &self.rtpcs, RtpcLayout::Sound)
    }
}

impl Positioning {
    fn read(c: &mut Cursor<'_>) -> Result<Self> {
        Ok(match c.read_u8()? {
            0 => Self::TwoD {
                enable_panner: c.read_bool()?,
            },
            1 => {
                let source_type = c.read_u32()?;
                let attenuation_id = c.read_u32()?;
                let spatialization = c.read_bool()?;
                let source = match source_type {
                    2 => PositionSource::UserDefined {
                        play_type: c.read_u32()?,
                        looping: c.read_bool()?,
                        transition_ms: c.read_u32()?,
                        follow_orientation: c.read_bool()?,
                    },
                    3 => PositionSource::GameDefined {
                        update_per_frame: c.read_bool()?,
                    },
                    other => PositionSource::Raw(other),
                };
                Self::ThreeD {
                    attenuation_id,
                    spatialization,
                    source,
                }
            }
            other => Self::Raw(other),
        })
    }

    fn write(&self, w: &mut Writer) {
        match *self {
            Self::TwoD { enable_panner } => {
                w.write_u8(0);
                w.write_bool(enable_panner);
            }
            Self::ThreeD {
                attenuation_id,
                spatialization,
                source,
            } => {
                w.write_u8(1);
                w.write_u32(source.source_type());
                w.write_u32(attenuation_id);
                w.write_bool(spatialization);
                match source {
                    PositionSource::UserDefined {
                        play_type,
                        looping,
                        transition_ms,
                        follow_orientation,
                    } => {
                        w.write_u32(play_type);
                        w.write_bool(looping);
                        w.write_u32(transition_ms);
                        w.write_bool(follow_orientation);
                    }
                    PositionSource::GameDefined { update_per_frame } => {
                        w.write_bool(update_per_frame);
                    }
                    PositionSource::Raw(_) => {}
                }
            }
            Self::Raw(dimension) => w.write_u8(dimension),
        }
    }
}

impl PositionSource {
    pub fn source_type(&self) -> u32 {
        match *self {
            Self::UserDefined { .. } => 2,
            Self::GameDefined { .. } => 3,
            Self::Raw(v) => v,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::hierarchy::common::{CurvePoint, EffectSlot, StateOverride};

    /// Settings with every optional block empty.
    pub(crate) fn minimal() -> PlaybackSettings {
        PlaybackSettings {
            override_parent: false,
            effects: None,
            output_bus: 0x1000,
            parent_id: 0x2000,
            override_priority: false,
            offset_priority_at_max_distance: false,
            params: Vec::new(),
            unknown: 0,
            positioning: None,
            override_game_aux: false,
            use_game_aux: false,
            override_user_aux: false,
            user_aux_buses: None,
            playback_limit: None,
            limit_method: 0,
            virtual_voice_behavior: 0,
            override_limit: false,
            override_virtual_voice: false,
            state_groups: Vec::new(),
            rtpcs: Vec::new(),
        }
    }

    fn encode(settings: &PlaybackSettings) -> Vec<u8> {
        let mut w = Writer::new();
        settings.write(&mut w).unwrap();
        w.into_bytes()
    }

    #[test]
    fn minimal_layout() {
        let bytes = encode(&minimal());
        // flags/ids up to the param count, unknown, positioning flag, four aux
        // flags, limit flag, four limit bytes, state group count, rtpc count.
        assert_eq!(bytes.len(), 1 + 1 + 4 + 4 + 1 + 1 + 1 + 1 + 1 + 4 + 1 + 4 + 4 + 2);
        let decoded = PlaybackSettings::read(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(decoded, minimal());
    }

    #[test]
    fn optional_blocks_set_their_flags() {
        let mut settings = minimal();
        settings.user_aux_buses = Some([1, 2, 3, 4]);
        settings.playback_limit = Some(PlaybackLimit {
            priority_equal: 1,
            limit_reached: 0,
            max_instances: 8,
        });
        let bytes = encode(&settings);

        // override_parent, effect count, bus, parent, two priority flags,
        // param count, unknown, positioning flag.
        let aux_flags = 1 + 1 + 4 + 4 + 1 + 1 + 1 + 1 + 1;
        assert_eq!(&bytes[aux_flags..aux_flags + 4], &[0, 0, 0, 1]);
        let limit_flag = aux_flags + 4 + 16;
        assert_eq!(bytes[limit_flag], 1);
        assert_eq!(&bytes[limit_flag + 1..limit_flag + 5], &[1, 0, 8, 0]);

        let decoded = PlaybackSettings::read(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(decoded, settings);
    }

    #[test]
    fn positioning_variants_survive() {
        let cases = [
            Positioning::TwoD {
                enable_panner: true,
            },
            Positioning::ThreeD {
                attenuation_id: 99,
                spatialization: true,
                source: PositionSource::UserDefined {
                    play_type: 2,
                    looping: true,
                    transition_ms: 250,
                    follow_orientation: false,
                },
            },
            Positioning::ThreeD {
                attenuation_id: 5,
                spatialization: false,
                source: PositionSource::GameDefined {
                    update_per_frame: true,
                },
            },
            Positioning::ThreeD {
                attenuation_id: 5,
                spatialization: false,
                source: PositionSource::Raw(7),
            },
            Positioning::Raw(4),
        ];
        for positioning in cases {
            let mut settings = minimal();
            settings.positioning = Some(positioning);
            let bytes = encode(&settings);
            let mut c = Cursor::new(&bytes);
            assert_eq!(PlaybackSettings::read(&mut c).unwrap(), settings);
            assert!(c.is_empty());
        }
    }

    #[test]
    fn fully_populated_record() {
        let mut settings = minimal();
        settings.override_parent = true;
        settings.effects = Some(EffectChain {
            bypass_mask: 0x10,
            slots: vec![EffectSlot {
                index: 0,
                effect_id: 0xabcd,
                reserved: [0, 0],
            }],
        });
        settings.params = vec![Param {
            kind: 0x07,
            value: 3,
        }];
        settings.state_groups = vec![StateGroup {
            group_id: 1,
            change_behavior: 0,
            states: vec![StateOverride {
                state_id: 2,
                settings_id: 3,
            }],
        }];
        settings.rtpcs = vec![Rtpc {
            parameter_id: 4,
            y_axis: 0,
            curve_id: Some(6),
            unknown0: 0,
            unknown1: 4,
            points: vec![
                CurvePoint {
                    x: 0.0,
                    y: -96.0,
                    curve: 4,
                },
                CurvePoint {
                    x: 100.0,
                    y: 0.0,
                    curve: 4,
                },
            ],
        }];
        let bytes = encode(&settings);
        let mut c = Cursor::new(&bytes);
        assert_eq!(PlaybackSettings::read(&mut c).unwrap(), settings);
        assert!(c.is_empty());
    }

    #[test]
    fn truncated_record_is_an_error() {
        let bytes = encode(&minimal());
        let short = &bytes[..bytes.len() - 1];
        assert!(PlaybackSettings::read(&mut Cursor::new(short)).is_err());
    }
}
