use crate::error::{Error, Result};

/// Read cursor over a byte slice. All reads are little-endian.
#[derive(Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Whether we've reached the end.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Remaining bytes from current position.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Skip `n` bytes forward.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    /// Read a slice of `n` bytes without copying.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read a fixed-size byte array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read a 4-byte magic/tag.
    pub fn read_magic(&mut self) -> Result<[u8; 4]> {
        self.read_array::<4>()
    }

    /// Everything from the current position to the end, consuming it.
    pub fn read_rest(&mut self) -> &'a [u8] {
        let start = self.pos.min(self.data.len());
        self.pos = self.data.len();
        &self.data[start..]
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        let v = self.data[self.pos];
        self.pos += 1;
        Ok(v)
    }

    /// Read a one-byte flag. Any non-zero value is `true`.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Read a u32-counted list of u32 ids.
    pub fn read_id_list(&mut self) -> Result<Vec<u32>> {
        let count = self.read_u32()? as usize;
        let mut ids = Vec::with_capacity(count.min(self.remaining() / 4));
        for _ in 0..count {
            ids.push(self.read_u32()?);
        }
        Ok(ids)
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if self.remaining() < n {
            return Err(Error::TruncatedInput {
                offset: self.pos,
                need: n,
                have: self.remaining(),
            });
        }
        Ok(())
    }
}

/// Writer that builds a byte buffer. All writes are little-endian.
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buf: Vec::with_capacity(cap),
        }
    }

    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_magic(&mut self, magic: &[u8; 4]) {
        self.buf.extend_from_slice(magic);
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.buf.push(u8::from(v));
    }

    pub fn write_i16(&mut self, v: i16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_f32(&mut self, v: f32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    /// Write a u32-counted list of u32 ids.
    pub fn write_id_list(&mut self, ids: &[u32]) -> Result<()> {
        self.write_u32(crate::error::len_u32(ids.len(), "id list")?);
        for &id in ids {
            self.write_u32(id);
        }
        Ok(())
    }

    /// Patch a u32 at a specific position (for backpatching sizes).
    pub fn patch_u32(&mut self, pos: usize, v: u32) {
        let bytes = v.to_le_bytes();
        self.buf[pos..pos + 4].copy_from_slice(&bytes);
    }

    /// Append `n` zero bytes.
    pub fn write_zeros(&mut self, n: usize) {
        self.buf.resize(self.buf.len() + n, 0);
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_are_little_endian() {
        let data = [0x01, 0x02, 0x03, 0x04, 0xff];
        let mut c = Cursor::new(&data);
        assert_eq!(c.read_u32().unwrap(), 0x0403_0201);
        assert_eq!(c.read_u8().unwrap(), 0xff);
        assert!(c.is_empty());
    }

    #[test]
    fn short_read_reports_truncation() {
        let data = [0u8; 3];
        let mut c = Cursor::new(&data);
        c.skip(1).unwrap();
        match c.read_u32() {
            Err(Error::TruncatedInput { offset, need, have }) => {
                assert_eq!((offset, need, have), (1, 4, 2));
            }
            other => panic!("expected truncation, got {other:?}"),
        }
        // A failed read leaves the position untouched.
        assert_eq!(c.position(), 1);
    }

    #[test]
    fn read_rest_consumes_everything() {
        let data = [1u8, 2, 3];
        let mut c = Cursor::new(&data);
        c.skip(1).unwrap();
        assert_eq!(c.read_rest(), [2, 3]);
        assert!(c.read_rest().is_empty());
        assert_eq!(c.remaining(), 0);
    }

    #[test]
    fn id_list_round_trip() {
        let mut w = Writer::new();
        w.write_id_list(&[7, 8, 9]).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 16);
        let mut c = Cursor::new(&bytes);
        assert_eq!(c.read_id_list().unwrap(), vec![7, 8, 9]);
    }

    #[test]
    fn patch_and_zeros() {
        let mut w = Writer::with_capacity(8);
        w.write_u32(0);
        w.write_zeros(3);
        w.patch_u32(0, 0xdead_beef);
        assert_eq!(w.position(), 7);
        assert_eq!(w.into_bytes(), [0xef, 0xbe, 0xad, 0xde, 0, 0, 0]);
    }
}
