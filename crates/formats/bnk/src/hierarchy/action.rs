//! Events and the actions they trigger.

use serde::Serialize;

use crate::cursor::{Cursor, Writer};
use crate::error::Result;

use super::common::{read_params, write_params, Param};

const SET_STATE: u8 = 0x12;
const SET_SWITCH: u8 = 0x19;

/// Kind 4: a named trigger that fires a list of actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub id: u32,
    pub action_ids: Vec<u32>,
}

impl Event {
    pub fn read(c: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            id: c.read_u32()?,
            action_ids: c.read_id_list()?,
        })
    }

    pub fn write(&self, w: &mut Writer) -> Result<()> {
        w.write_u32(self.id);
        w.write_id_list(&self.action_ids)
    }
}

/// Kind 3: one action (play, stop, set state, ...) on a target object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventAction {
    pub id: u32,
    pub scope: u8,
    pub action: Action,
    pub game_object_id: u32,
    pub unknown0: u8,
    /// Delay, fade and probability parameters; kept raw.
    pub params: Vec<Param<u32>>,
    pub unknown1: u8,
}

/// The action type byte, with the trailing arguments of the types that have
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Action {
    SetState { group_id: u32, state_id: u32 },
    SetSwitch { group_id: u32, switch_id: u32 },
    /// Every other action type; no trailing arguments.
    Other(u8),
}

impl Action {
    pub fn as_u8(&self) -> u8 {
        match *self {
            Self::SetState { .. } => SET_STATE,
            Self::SetSwitch { .. } => SET_SWITCH,
            Self::Other(v) => v,
        }
    }
}

impl EventAction {
    pub fn read(c: &mut Cursor<'_>) -> Result<Self> {
        let id = c.read_u32()?;
        let scope = c.read_u8()?;
        let action_type = c.read_u8()?;
        let game_object_id = c.read_u32()?;
        let unknown0 = c.read_u8()?;
        let params = read_params(c)?;
        let unknown1 = c.read_u8()?;
        let action = match action_type {
            SET_STATE => Action::SetState {
                group_id: c.read_u32()?,
                state_id: c.read_u32()?,
            },
            SET_SWITCH => Action::SetSwitch {
                group_id: c.read_u32()?,
                switch_id: c.read_u32()?,
            },
            other => Action::Other(other),
        };
        Ok(Self {
            id,
            scope,
            action,
            game_object_id,
            unknown0,
            params,
            unknown1,
        })
    }

    pub fn write(&self, w: &mut Writer) -> Result<()> {
        w.write_u32(self.id);
        w.write_u8(self.scope);
        w.write_u8(self.action.as_u8());
        w.write_u32(self.game_object_id);
        w.write_u8(self.unknown0);
        write_params(w, &self.params)?;
        w.write_u8(self.unknown1);
        match self.action {
            Action::SetState { group_id, state_id } => {
                w.write_u32(group_id);
                w.write_u32(state_id);
            }
            Action::SetSwitch {
                group_id,
                switch_id,
            } => {
                w.write_u32(group_id);
                w.write_u32(switch_id);
            }
            Action::Other(_) => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(action: Action) -> EventAction {
        EventAction {
            id: 7,
            scope: 3,
            action,
            game_object_id: 0x55,
            unknown0: 0,
            params: vec![Param { kind: 0x0e, value: 250 }],
            unknown1: 0,
        }
    }

    fn encode(a: &EventAction) -> Vec<u8> {
        let mut w = Writer::new();
        a.write(&mut w).unwrap();
        w.into_bytes()
    }

    #[test]
    fn play_has_no_arguments() {
        let play = action(Action::Other(0x04));
        let bytes = encode(&play);
        assert_eq!(bytes.len(), 4 + 1 + 1 + 4 + 1 + 1 + 1 + 4 + 1);
        assert_eq!(bytes[5], 0x04);
        assert_eq!(EventAction::read(&mut Cursor::new(&bytes)).unwrap(), play);
    }

    #[test]
    fn set_state_and_set_switch_carry_two_ids() {
        for a in [
            Action::SetState {
                group_id: 10,
                state_id: 11,
            },
            Action::SetSwitch {
                group_id: 20,
                switch_id: 21,
            },
        ] {
            let ea = action(a);
            let bytes = encode(&ea);
            assert_eq!(bytes.len(), 18 + 8);
            let mut c = Cursor::new(&bytes);
            assert_eq!(EventAction::read(&mut c).unwrap(), ea);
            assert!(c.is_empty());
        }
    }

    #[test]
    fn event_lists_action_ids() {
        let event = Event {
            id: 1,
            action_ids: vec![7, 8],
        };
        let mut w = Writer::new();
        event.write(&mut w).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(&bytes[4..8], &2u32.to_le_bytes());
        assert_eq!(Event::read(&mut Cursor::new(&bytes)).unwrap(), event);
    }
}
