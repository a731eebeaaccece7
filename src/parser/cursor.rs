//! Bounds-checked reader over captured bytes.

use crate::error::{DecodeError, Layer};

/// Sequential big-endian reader that never reads past its slice.
///
/// Every read returns `DecodeError::TruncatedFrame` instead of touching
/// bytes outside the captured extent.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    layer: Layer,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8], layer: Layer) -> Self {
        Self {
            data,
            pos: 0,
            layer,
        }
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Fail unless at least `len` more bytes are available.
    pub fn require(&self, len: usize) -> Result<(), DecodeError> {
        if len > self.remaining() {
            return Err(DecodeError::TruncatedFrame {
                layer: self.layer,
                required: self.pos + len,
                available: self.data.len(),
            });
        }
        Ok(())
    }

    /// Look at the next `len` bytes without consuming them.
    pub fn peek(&self, len: usize) -> Result<&'a [u8], DecodeError> {
        self.require(len)?;
        Ok(&self.data[self.pos..self.pos + len])
    }

    /// Take the next `len` bytes as a slice.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let bytes = self.peek(len)?;
        self.pos += len;
        Ok(bytes)
    }

    pub fn skip(&mut self, len: usize) -> Result<(), DecodeError> {
        self.take(len).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16_be(&mut self) -> Result<u16, DecodeError> {
        let bytes = self.read_array::<2>()?;
        Ok(u16::from_be_bytes(bytes))
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Everything not yet read, consuming the cursor.
    pub fn rest(self) -> &'a [u8] {
        &self.data[self.pos..]
    }
}
