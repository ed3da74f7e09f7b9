//! Building blocks shared by several hierarchy object kinds.

use serde::Serialize;

use crate::cursor::{Cursor, Writer};
use crate::error::{len_u16, len_u32, len_u8, Result};

/// A 32-bit field whose interpretation depends on a neighbouring type byte.
pub trait Scalar: Copy {
    fn read(c: &mut Cursor<'_>) -> Result<Self>;
    fn write(self, w: &mut Writer);
}

impl Scalar for u32 {
    fn read(c: &mut Cursor<'_>) -> Result<Self> {
        c.read_u32()
    }

    fn write(self, w: &mut Writer) {
        w.write_u32(self)
    }
}

impl Scalar for f32 {
    fn read(c: &mut Cursor<'_>) -> Result<Self> {
        c.read_f32()
    }

    fn write(self, w: &mut Writer) {
        w.write_f32(self)
    }
}

/// One entry of a typed parameter list.
///
/// On disk the list is split: a u8 count, then every type byte, then every
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Param<T> {
    /// Parameter type byte (volume, pitch, low-pass, ...).
    pub kind: u8,
    pub value: T,
}

pub(crate) fn read_params<T: Scalar>(c: &mut Cursor<'_>) -> Result<Vec<Param<T>>> {
    let count = c.read_u8()? as usize;
    let kinds = c.read_bytes(count)?;
    let mut params = Vec::with_capacity(count);
    for &kind in kinds {
        params.push(Param {
            kind,
            value: T::read(c)?,
        });
    }
    Ok(params)
}

pub(crate) fn write_params<T: Scalar>(w: &mut Writer, params: &[Param<T>]) -> Result<()> {
    w.write_u8(len_u8(params.len(), "parameter list")?);
    for p in params {
        w.write_u8(p.kind);
    }
    for p in params {
        p.value.write(w);
    }
    Ok(())
}

/// Effect slots attached to a sound or bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectChain {
    /// Per-slot bypass bits.
    pub bypass_mask: u8,
    pub slots: Vec<EffectSlot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EffectSlot {
    pub index: u8,
    pub effect_id: u32,
    /// Two bytes after every slot; zero in every bank seen so far.
    pub reserved: [u8; 2],
}

/// Read a u8 effect count and, when it is non-zero, the bypass mask and slots.
pub(crate) fn read_effects(c: &mut Cursor<'_>) -> Result<Option<EffectChain>> {
    let count = c.read_u8()?;
    if count == 0 {
        return Ok(None);
    }
    let bypass_mask = c.read_u8()?;
    let mut slots = Vec::with_capacity(count as usize);
    for _ in 0..count {
        slots.push(EffectSlot {
            index: c.read_u8()?,
            effect_id: c.read_u32()?,
            reserved: c.read_array()?,
        });
    }
    Ok(Some(EffectChain { bypass_mask, slots }))
}

pub(crate) fn write_effects(w: &mut Writer, effects: Option<&EffectChain>) -> Result<()> {
    let Some(chain) = effects.filter(|chain| !chain.slots.is_empty()) else {
        w.write_u8(0);
        return Ok(());
    };
    w.write_u8(len_u8(chain.slots.len(), "effect chain")?);
    w.write_u8(chain.bypass_mask);
    for slot in &chain.slots {
        w.write_u8(slot.index);
        w.write_u32(slot.effect_id);
        w.write_bytes(&slot.reserved);
    }
    Ok(())
}

/// Curve binding between a game parameter and a property of the object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rtpc {
    /// Game parameter driving the x axis.
    pub parameter_id: u32,
    /// Property driven on the y axis.
    pub y_axis: u32,
    /// Present in sound-level bindings only; bus bindings omit it.
    pub curve_id: Option<u32>,
    pub unknown0: u8,
    pub unknown1: u8,
    pub points: Vec<CurvePoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub x: f32,
    pub y: f32,
    /// Interpolation shape towards the next point.
    pub curve: u32,
}

/// Which of the two on-disk RTPC layouts a list uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RtpcLayout {
    /// Playback settings: carries a curve id after the y axis.
    Sound,
    /// Audio bus: no curve id.
    Bus,
}

pub(crate) fn read_rtpcs(c: &mut Cursor<'_>, layout: RtpcLayout) -> Result<Vec<Rtpc>> {
    let count = c.read_u16()?;
    let mut rtpcs = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let parameter_id = c.read_u32()?;
        let y_axis = c.read_u32()?;
        let curve_id = match layout {
            RtpcLayout::Sound => Some(c.read_u32()?),
            RtpcLayout::Bus => None,
        };
        let unknown0 = c.read_u8()?;
        let point_count = c.read_u8()?;
        let unknown1 = c.read_u8()?;
        let mut points = Vec::with_capacity(point_count as usize);
        for _ in 0..point_count {
            points.push(CurvePoint {
                x: c.read_f32()?,
                y: c.read_f32()?,
                curve: c.read_u32()?,
            });
        }
        rtpcs.push(Rtpc {
            parameter_id,
            y_axis,
            curve_id,
            unknown0,
            unknown1,
            points,
        });
    }
    Ok(rtpcs)
}

pub(crate) fn write_rtpcs(w: &mut Writer, rtpcs: &[Rtpc], layout: RtpcLayout) -> Result<()> {
    w.write_u16(len_u16(rtpcs.len(), "rtpc list")?);
    for rtpc in rtpcs {
        w.write_u32(rtpc.parameter_id);
        w.write_u32(rtpc.y_axis);
        if layout == RtpcLayout::Sound {
            w.write_u32(rtpc.curve_id.unwrap_or(0));
        }
        w.write_u8(rtpc.unknown0);
        w.write_u8(len_u8(rtpc.points.len(), "rtpc points")?);
        w.write_u8(rtpc.unknown1);
        for p in &rtpc.points {
            w.write_f32(p.x);
            w.write_f32(p.y);
            w.write_u32(p.curve);
        }
    }
    Ok(())
}

/// State group binding with per-state settings overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateGroup {
    pub group_id: u32,
    /// When a state change takes effect (immediate, next bar, next cue, ...).
    pub change_behavior: u8,
    pub states: Vec<StateOverride>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StateOverride {
    pub state_id: u32,
    pub settings_id: u32,
}

pub(crate) fn read_state_groups(c: &mut Cursor<'_>) -> Result<Vec<StateGroup>> {
    let count = c.read_u32()? as usize;
    // Each group is at least 7 bytes; cap the reservation by what is left.
    let mut groups = Vec::with_capacity(count.min(c.remaining() / 7));
    for _ in 0..count {
        let group_id = c.read_u32()?;
        let change_behavior = c.read_u8()?;
        let state_count = c.read_u16()?;
        let mut states = Vec::with_capacity(state_count as usize);
        for _ in 0..state_count {
            states.push(StateOverride {
                state_id: c.read_u32()?,
                settings_id: c.read_u32()?,
            });
        }
        groups.push(StateGroup {
            group_id,
            change_behavior,
            states,
        });
    }
    Ok(groups)
}

pub(crate) fn write_state_groups(w: &mut Writer, groups: &[StateGroup]) -> Result<()> {
    w.write_u32(len_u32(groups.len(), "state groups")?);
    for group in groups {
        w.write_u32(group.group_id);
        w.write_u8(group.change_behavior);
        w.write_u16(len_u16(group.states.len(), "state overrides")?);
        for s in &group.states {
            w.write_u32(s.state_id);
            w.write_u32(s.settings_id);
        }
    }
    Ok(())
}
