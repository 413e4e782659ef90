use std::io;

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use item::{MetricsError, Result};

/// Rounds `len` up to the parcel's 4-byte alignment.
fn pad_size(len: usize) -> usize {
    (len + 3) & !3
}

/// A flat, append-only write buffer with a separate read position.
///
/// Writes always append at the end; reads start at [`data_position`] and
/// advance it. Every read is bounds-checked and a failed read leaves the
/// position untouched.
///
/// [`data_position`]: Parcel::data_position
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parcel {
    data: Vec<u8>,
    pos: usize,
}

impl Parcel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps received bytes for reading from the start.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    pub fn data_position(&self) -> usize {
        self.pos
    }

    /// Moves the read position, clamped to the end of the data.
    pub fn set_data_position(&mut self, pos: usize) {
        self.pos = pos.min(self.data.len());
    }

    pub fn data_avail(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Drops everything written after `len`. Used to roll back a failed write.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.data.truncate(len);
        self.pos = self.pos.min(len);
    }

    // ---- writes ----

    pub fn write_i32(&mut self, v: i32) {
        let mut b = [0u8; 4];
        LittleEndian::write_i32(&mut b, v);
        self.data.extend_from_slice(&b);
    }

    pub fn write_i64(&mut self, v: i64) {
        let mut b = [0u8; 8];
        LittleEndian::write_i64(&mut b, v);
        self.data.extend_from_slice(&b);
    }

    pub fn write_f64(&mut self, v: f64) {
        let mut b = [0u8; 8];
        LittleEndian::write_f64(&mut b, v);
        self.data.extend_from_slice(&b);
    }

    /// Appends `s` with a NUL terminator and zero padding to 4 bytes.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `s` contains an interior NUL.
    pub fn write_cstring(&mut self, s: &str) -> Result<()> {
        if s.as_bytes().contains(&0) {
            return Err(MetricsError::InvalidArgument(
                "parcel string contains an interior NUL".to_string(),
            ));
        }
        let padded = pad_size(s.len() + 1);
        self.data.extend_from_slice(s.as_bytes());
        self.data.resize(self.data.len() + padded - s.len(), 0);
        Ok(())
    }

    // ---- reads ----

    fn remaining(&self) -> &[u8] {
        &self.data[self.pos..]
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let v = self.remaining().read_i32::<LittleEndian>().map_err(short("i32"))?;
        self.pos += 4;
        Ok(v)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        let v = self.remaining().read_i64::<LittleEndian>().map_err(short("i64"))?;
        self.pos += 8;
        Ok(v)
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        let v = self.remaining().read_f64::<LittleEndian>().map_err(short("f64"))?;
        self.pos += 8;
        Ok(v)
    }

    /// Reads a NUL-terminated string and skips its padding.
    ///
    /// # Errors
    ///
    /// `Malformed` if there is no terminator, the padding is cut short, or the
    /// bytes are not UTF-8.
    pub fn read_cstring(&mut self) -> Result<String> {
        let rest = self.remaining();
        let nul = rest.iter().position(|&b| b == 0).ok_or_else(|| {
            MetricsError::Malformed("parcel string is not NUL-terminated".to_string())
        })?;
        let padded = pad_size(nul + 1);
        if padded > rest.len() {
            return Err(MetricsError::Malformed(
                "parcel string padding is truncated".to_string(),
            ));
        }
        let s = std::str::from_utf8(&rest[..nul])
            .map_err(|e| MetricsError::Malformed(format!("parcel string is not UTF-8: {}", e)))?
            .to_string();
        self.pos += padded;
        Ok(s)
    }
}

fn short(what: &'static str) -> impl Fn(io::Error) -> MetricsError {
    move |e| MetricsError::Malformed(format!("parcel too short for {}: {}", what, e))
}
