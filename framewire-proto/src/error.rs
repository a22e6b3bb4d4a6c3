//! Encode and decode errors.

use std::{fmt, io};

use crate::wire::Width;

/// A value that does not fit its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("value {value} exceeds maximum {max}")]
pub struct Overflow {
    pub value: u64,
    pub max: u64,
}

/// Failure to overwrite bytes a writer already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    #[error("patch of {} byte(s) at offset {offset} is past the {len} bytes written", .width.bytes())]
    OutOfRange { offset: usize, width: Width, len: usize },
    #[error(transparent)]
    Overflow(#[from] Overflow),
}

/// Which part of a frame an [`EncodeError`] is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Cmd,
    SeqAndFlags,
    PayloadLength,
    Sequence,
    Flags,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Cmd => "cmd",
            Field::SeqAndFlags => "seq_and_flags",
            Field::PayloadLength => "payload length",
            Field::Sequence => "sequence number",
            Field::Flags => "flags",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("{field} does not fit its wire field: {source}")]
    FieldOverflow {
        field: Field,
        #[source]
        source: Overflow,
    },
    #[error("payload of {len} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { len: usize, limit: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Not enough bytes yet. Nothing was consumed; buffer more and retry.
    #[error("incomplete frame: {available} of {needed} bytes available")]
    Incomplete { needed: usize, available: usize },
    /// The declared payload length is beyond the sanity ceiling. The buffer
    /// cannot be trusted past this point.
    #[error("malformed frame: declared payload length {declared} exceeds limit {limit}")]
    Malformed { declared: usize, limit: usize },
}

impl DecodeError {
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DecodeError::Incomplete { .. })
    }
}

impl From<EncodeError> for io::Error {
    fn from(e: EncodeError) -> Self {
        io::Error::new(io::ErrorKind::InvalidInput, e)
    }
}

impl From<DecodeError> for io::Error {
    fn from(e: DecodeError) -> Self {
        match e {
            DecodeError::Incomplete { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, e),
            DecodeError::Malformed { .. } => io::Error::new(io::ErrorKind::InvalidData, e),
        }
    }
}
