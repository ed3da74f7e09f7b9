use serde::Serialize;

use crate::cursor::{Cursor, Writer};
use crate::error::Result;

use super::common::{read_params, write_params, Param};

/// Kind 1: a bag of typed float settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub id: u32,
    pub values: Vec<Param<f32>>,
}

impl Settings {
    pub fn read(c: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            id: c.read_u32()?,
            values: read_params(c)?,
        })
    }

    pub fn write(&self, w: &mut Writer) -> Result<()> {
        w.write_u32(self.id);
        write_params(w, &self.values)
    }
}
