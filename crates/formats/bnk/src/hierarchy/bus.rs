use serde::Serialize;

use crate::cursor::{Cursor, Writer};
use crate::error::{len_u32, Result};

use super::common::{
    read_effects, read_params, read_rtpcs, read_state_groups, write_effects, write_params,
    write_rtpcs, write_state_groups, EffectChain, Param, Rtpc, RtpcLayout, StateGroup,
};

/// Kind 8: a mixing bus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioBus {
    pub id: u32,
    pub parent_bus_id: u32,
    pub params: Vec<Param<f32>>,
    pub priority_equal: u8,
    pub limit_reached: u8,
    pub max_instances: u16,
    pub override_limit: bool,
    pub unknown: u32,
    pub ducking_recover_ms: u32,
    pub max_duck_volume: f32,
    pub ducked_buses: Vec<DuckedBus>,
    pub effects: Option<EffectChain>,
    /// Bus bindings have no curve id.
    pub rtpcs: Vec<Rtpc>,
    pub state_groups: Vec<StateGroup>,
}

/// A bus that is ducked while this one is active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DuckedBus {
    pub bus_id: u32,
    pub volume: f32,
    pub fade_out_ms: u32,
    pub fade_in_ms: u32,
    pub curve: u8,
    pub target: u8,
}

impl AudioBus {
    pub fn read(c: &mut Cursor<'_>) -> Result<Self> {
        let id = c.read_u32()?;
        let parent_bus_id = c.read_u32()?;
        let params = read_params(c)?;
        let priority_equal = c.read_u8()?;
        let limit_reached = c.read_u8()?;
        let max_instances = c.read_u16()?;
        let override_limit = c.read_bool()?;
        let unknown = c.read_u32()?;
        let ducking_recover_ms = c.read_u32()?;
        let max_duck_volume = c.read_f32()?;

        let count = c.read_u32()? as usize;
        let mut ducked_buses = Vec::with_capacity(count.min(c.remaining() / 18));
        for _ in 0..count {
            ducked_buses.push(DuckedBus {
                bus_id: c.read_u32()?,
                volume: c.read_f32()?,
                fade_out_ms: c.read_u32()?,
                fade_in_ms: c.read_u32()?,
                curve: c.read_u8()?,
                target: c.read_u8()?,
            });
        }

        Ok(Self {
            id,
            parent_bus_id,
            params,
            priority_equal,
            limit_reached,
            max_instances,
            override_limit,
            unknown,
            ducking_recover_ms,
            max_duck_volume,
            ducked_buses,
            effects: read_effects(c)?,
            rtpcs: read_rtpcs(c, RtpcLayout::Bus)?,
            state_groups: read_state_groups(c)?,
        })
    }

    pub fn write(&self, w: &mut Writer) -> Result<()> {
        w.write_u32(self.id);
        w.write_u32(self.parent_bus_id);
        write_params(w, &self.params)?;
        w.write_u8(self.priority_equal);
        w.write_u8(self.limit_reached);
        w.write_u16(self.max_instances);
        w.write_bool(self.override_limit);
        w.write_u32(self.unknown);
        w.write_u32(self.ducking_recover_ms);
        w.write_f32(self.max_duck_volume);
        w.write_u32(len_u32(self.ducked_buses.len(), "ducked buses")?);
        for d in &self.ducked_buses {
            w.write_u32(d.bus_id);
            w.write_f32(d.volume);
            w.write_u32(d.fade_out_ms);
            w.write_u32(d.fade_in_ms);
            w.write_u8(d.curve);
            w.write_u8(d.target);
        }
        write_effects(w, self.effects.as_ref())?;
        write_rtpcs(w, &self.rtpcs, RtpcLayout::Bus)?;
        write_state_groups(w, &self.state_groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::common::CurvePoint;

    #[test]
    fn bus_round_trip() {
        let bus = AudioBus {
            id: 0xb05,
            parent_bus_id: 0,
            params: vec![Param { kind: 0x06, value: -3.0 }],
            priority_equal: 0,
            limit_reached: 1,
            max_instances: 50,
            override_limit: true,
            unknown: 0,
            ducking_recover_ms: 500,
            max_duck_volume: -96.0,
            ducked_buses: vec![DuckedBus {
                bus_id: 0xd0c,
                volume: -12.0,
                fade_out_ms: 100,
                fade_in_ms: 300,
                curve: 4,
                target: 0,
            }],
            effects: None,
            rtpcs: vec![Rtpc {
                parameter_id: 1,
                y_axis: 6,
                curve_id: None,
                unknown0: 0,
                unknown1: 4,
                points: vec![CurvePoint { x: 0.0, y: 0.0, curve: 4 }],
            }],
            state_groups: Vec::new(),
        };
        let mut w = Writer::new();
        bus.write(&mut w).unwrap();
        let bytes = w.into_bytes();

        // id, parent, params (1 + 1 + 4), limit block (4), override, unknown,
        // recover, volume, ducked count + one entry, effects, rtpc (2 + 11 + 12),
        // state group count.
        let expected = 4 + 4 + 6 + 4 + 1 + 4 + 4 + 4 + 4 + 18 + 1 + 25 + 4;
        assert_eq!(bytes.len(), expected);

        let mut c = Cursor::new(&bytes);
        assert_eq!(AudioBus::read(&mut c).unwrap(), bus);
        assert!(c.is_empty());
    }
}
