use serde::Serialize;

use crate::cursor::{Cursor, Writer};
use crate::error::Result;

/// Bank header (`BKHD`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bkhd {
    pub version: u32,
    pub bank_id: u32,
    /// Rest of the payload (two zero u32s in every bank seen so far).
    pub reserved: Vec<u8>,
}

impl Bkhd {
    pub fn parse(chunk_data: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(chunk_data);
        Ok(Self {
            version: c.read_u32()?,
            bank_id: c.read_u32()?,
            reserved: c.read_rest().to_vec(),
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(8 + self.reserved.len());
        w.write_u32(self.version);
        w.write_u32(self.bank_id);
        w.write_bytes(&self.reserved);
        w.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_bytes_are_kept() {
        let data = [0x48, 0, 0, 0, 0x21, 0x43, 0x65, 0x87, 0, 0, 0, 0, 0, 0, 0, 0];
        let bkhd = Bkhd::parse(&data).unwrap();
        assert_eq!(bkhd.version, 0x48);
        assert_eq!(bkhd.bank_id, 0x8765_4321);
        assert_eq!(bkhd.reserved.len(), 8);
        assert_eq!(bkhd.to_bytes(), data);
    }

    #[test]
    fn short_header_fails() {
        assert!(Bkhd::parse(&[1, 0, 0, 0, 2]).is_err());
    }
}
