//! Incremental byte writer used by the encoder.

use crate::error::{Overflow, PatchError};
use crate::wire::Width;

/// Something a [`ByteWriter`] can append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value<'a> {
    /// Unsigned integer written big-endian at a fixed width.
    Uint { width: Width, value: u64 },
    /// Raw bytes, written as is.
    Bytes(&'a [u8]),
}

impl<'a> Value<'a> {
    pub fn uint(width: Width, value: impl Into<u64>) -> Self {
        Value::Uint {
            width,
            value: value.into(),
        }
    }

    /// Bytes this value occupies once written.
    pub fn encoded_len(&self) -> usize {
        match self {
            Value::Uint { width, .. } => width.bytes(),
            Value::Bytes(b) => b.len(),
        }
    }

    fn check(&self) -> Result<(), Overflow> {
        match *self {
            Value::Uint { width, value } if !width.fits(value) => Err(Overflow {
                value,
                max: width.max(),
            }),
            _ => Ok(()),
        }
    }
}

/// Growable byte sink for a single in-progress encode.
///
/// A writer is owned by one encode at a time; it is never shared between
/// concurrent encodes.
#[allow(clippy::len_without_is_empty)]
pub trait ByteWriter {
    /// Append `value`.
    ///
    /// Fails only when an integer does not fit its declared width, in which
    /// case nothing is appended and the writer is unchanged.
    fn write(&mut self, value: Value<'_>) -> Result<(), Overflow>;

    /// Number of bytes written so far.
    fn len(&self) -> usize;

    /// Everything written so far. Does not reset or consume the writer.
    fn data(&self) -> &[u8];
}

impl ByteWriter for Vec<u8> {
    fn write(&mut self, value: Value<'_>) -> Result<(), Overflow> {
        value.check()?;
        match value {
            Value::Uint { width, value } => self.extend(width.encode(value)),
            Value::Bytes(b) => self.extend_from_slice(b),
        }
        Ok(())
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn data(&self) -> &[u8] {
        self
    }
}

/// `Vec<u8>` backed writer that can also patch bytes it already wrote, for
/// encoders that backfill a length after writing variable content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VecWriter {
    buf: Vec<u8>,
}

impl VecWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Overwrite `width` bytes at `offset` with `value`.
    ///
    /// The range must already have been written. On error nothing changes.
    pub fn patch(&mut self, offset: usize, width: Width, value: u64) -> Result<(), PatchError> {
        let len = self.buf.len();
        let end = offset
            .checked_add(width.bytes())
            .filter(|end| *end <= len)
            .ok_or(PatchError::OutOfRange { offset, width, len })?;
        Value::uint(width, value).check()?;
        for (slot, b) in self.buf[offset..end].iter_mut().zip(width.encode(value)) {
            *slot = b;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

impl ByteWriter for VecWriter {
    fn write(&mut self, value: Value<'_>) -> Result<(), Overflow> {
        self.buf.write(value)
    }

    fn len(&self) -> usize {
        self.buf.len()
    }

    fn data(&self) -> &[u8] {
        &self.buf
    }
}

impl From<VecWriter> for Vec<u8> {
    fn from(w: VecWriter) -> Self {
        w.buf
    }
}
