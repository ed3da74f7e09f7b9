use serde::Serialize;

use crate::cursor::{Cursor, Writer};
use crate::error::{len_u32, len_u8, Error, Result};

/// Bank name table (`STID`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stid {
    /// 1 in every bank seen so far.
    pub unknown: u32,
    pub banks: Vec<BankName>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankName {
    pub bank_id: u32,
    pub name: String,
}

impl Stid {
    pub fn parse(chunk_data: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(chunk_data);
        let unknown = c.read_u32()?;
        let count = c.read_u32()? as usize;
        let mut banks = Vec::with_capacity(count.min(c.remaining() / 5));
        for _ in 0..count {
            let bank_id = c.read_u32()?;
            let len = c.read_u8()? as usize;
            let offset = c.position();
            let name = String::from_utf8(c.read_bytes(len)?.to_vec())
                .map_err(|source| Error::InvalidString { offset, source })?;
            banks.push(BankName { bank_id, name });
        }
        Ok(Self { unknown, banks })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut w = Writer::new();
        w.write_u32(self.unknown);
        w.write_u32(len_u32(self.banks.len(), "bank names")?);
        for bank in &self.banks {
            w.write_u32(bank.bank_id);
            w.write_u8(len_u8(bank.name.len(), "bank name")?);
            w.write_bytes(bank.name.as_bytes());
        }
        Ok(w.into_bytes())
    }

    /// Name of the bank with the given id.
    pub fn name_of(&self, bank_id: u32) -> Option<&str> {
        self.banks
            .iter()
            .find(|b| b.bank_id == bank_id)
            .map(|b| b.name.as_str())
    }
}
