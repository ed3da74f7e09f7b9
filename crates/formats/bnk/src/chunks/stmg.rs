use serde::Serialize;

use crate::cursor::{Cursor, Writer};
use crate::error::{len_u32, Result};

/// Project-wide settings (`STMG`), present in the init bank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stmg {
    pub volume_threshold: f32,
    pub max_voices: u16,
    pub state_groups: Vec<GlobalStateGroup>,
    pub switch_groups: Vec<SwitchGroup>,
    pub game_parameters: Vec<GameParameter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalStateGroup {
    pub id: u32,
    pub default_transition_ms: u32,
    pub transitions: Vec<StateTransition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StateTransition {
    pub from: u32,
    pub to: u32,
    pub time_ms: u32,
}

/// A switch group driven by a game parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchGroup {
    pub id: u32,
    pub game_parameter_id: u32,
    pub points: Vec<SwitchPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SwitchPoint {
    pub value: f32,
    pub switch_id: u32,
    pub curve: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GameParameter {
    pub id: u32,
    pub default: f32,
}

impl Stmg {
    pub fn parse(chunk_data: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(chunk_data);
        let volume_threshold = c.read_f32()?;
        let max_voices = c.read_u16()?;

        let state_groups = read_counted(&mut c, 12, |c| {
            let id = c.read_u32()?;
            let default_transition_ms = c.read_u32()?;
            let transitions = read_counted(c, 12, |c| {
                Ok(StateTransition {
                    from: c.read_u32()?,
                    to: c.read_u32()?,
                    time_ms: c.read_u32()?,
                })
            })?;
            Ok(GlobalStateGroup {
                id,
                default_transition_ms,
                transitions,
            })
        })?;

        let switch_groups = read_counted(&mut c, 12, |c| {
            let id = c.read_u32()?;
            let game_parameter_id = c.read_u32()?;
            let points = read_counted(c, 12, |c| {
                Ok(SwitchPoint {
                    value: c.read_f32()?,
                    switch_id: c.read_u32()?,
                    curve: c.read_u32()?,
                })
            })?;
            Ok(SwitchGroup {
                id,
                game_parameter_id,
                points,
            })
        })?;

        let game_parameters = read_counted(&mut c, 8, |c| {
            Ok(GameParameter {
                id: c.read_u32()?,
                default: c.read_f32()?,
            })
        })?;

        Ok(Self {
            volume_threshold,
            max_voices,
            state_groups,
            switch_groups,
            game_parameters,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut w = Writer::new();
        w.write_f32(self.volume_threshold);
        w.write_u16(self.max_voices);

        w.write_u32(len_u32(self.state_groups.len(), "state groups")?);
        for g in &self.state_groups {
            w.write_u32(g.id);
            w.write_u32(g.default_transition_ms);
            w.write_u32(len_u32(g.transitions.len(), "state transitions")?);
            for t in &g.transitions {
                w.write_u32(t.from);
                w.write_u32(t.to);
                w.write_u32(t.time_ms);
            }
        }

        w.write_u32(len_u32(self.switch_groups.len(), "switch groups")?);
        for g in &self.switch_groups {
            w.write_u32(g.id);
            w.write_u32(g.game_parameter_id);
            w.write_u32(len_u32(g.points.len(), "switch points")?);
            for p in &g.points {
                w.write_f32(p.value);
                w.write_u32(p.switch_id);
                w.write_u32(p.curve);
            }
        }

        w.write_u32(len_u32(self.game_parameters.len(), "game parameters")?);
        for p in &self.game_parameters {
            w.write_u32(p.id);
            w.write_f32(p.default);
        }
        Ok(w.into_bytes())
    }
}

fn read_counted<'a, T>(
    c: &mut Cursor<'a>,
    min_size: usize,
    mut read: impl FnMut(&mut Cursor<'a>) -> Result<T>,
) -> Result<Vec<T>> {
    let count = c.read_u32()? as usize;
    let mut items = Vec::with_capacity(count.min(c.remaining() / min_size));
    for _ in 0..count {
        items.push(read(c)?);
    }
    Ok(items)
}
