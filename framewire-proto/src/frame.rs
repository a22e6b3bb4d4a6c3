//! The `Frame` record and its packed sequence/flags word.

use std::fmt;
use std::io::{self, Read, Write};

use crate::codec::Codec;
use crate::error::{EncodeError, Field, Overflow};
use crate::wire::{FLAG_BITS, FLAGS_MASK, HEADER_SIZE, MAX_SEQ};

/// One protocol message: opcode, packed sequence/flags word, payload.
///
/// Field values are held wider than their wire fields; the codec rejects
/// anything that does not fit when encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Frame {
    pub cmd: u32,
    pub seq_and_flags: u32,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(cmd: u32, seq_and_flags: u32, data: Vec<u8>) -> Self {
        Self {
            cmd,
            seq_and_flags,
            data,
        }
    }

    /// Build a frame from an unpacked sequence number and flag set.
    pub fn with_seq(cmd: u32, seq: u32, flags: u32, data: Vec<u8>) -> Result<Self, EncodeError> {
        Ok(Self::new(cmd, SeqFlags::pack(seq, flags)?, data))
    }

    pub fn seq(&self) -> u32 {
        SeqFlags::unpack(self.seq_and_flags).seq
    }

    pub fn flags(&self) -> u32 {
        SeqFlags::unpack(self.seq_and_flags).flags
    }

    /// Whether flag bit `bit` (0 = least significant) is set.
    pub fn has_flag(&self, bit: u32) -> bool {
        bit < FLAG_BITS && self.flags() & (1 << bit) != 0
    }

    /// Size of this frame on the wire.
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.data.len()
    }

    /// Write frame to a writer
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        Codec::default().write_to(self, writer)
    }

    /// Read frame from a reader
    pub fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        Codec::default().read_from(reader)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frame(cmd=0x{:02x}): seq={} flags={} data={}",
            self.cmd,
            self.seq(),
            self.flags(),
            self.data.len()
        )
    }
}

/// Unpacked view of the seq/flags word: sequence number in the high bits,
/// flags in the low [`FLAG_BITS`] bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeqFlags {
    pub seq: u32,
    pub flags: u32,
}

impl SeqFlags {
    pub fn pack(seq: u32, flags: u32) -> Result<u32, EncodeError> {
        if seq > MAX_SEQ {
            return Err(EncodeError::FieldOverflow {
                field: Field::Sequence,
                source: Overflow {
                    value: seq.into(),
                    max: MAX_SEQ.into(),
                },
            });
        }
        if flags > FLAGS_MASK {
            return Err(EncodeError::FieldOverflow {
                field: Field::Flags,
                source: Overflow {
                    value: flags.into(),
                    max: FLAGS_MASK.into(),
                },
            });
        }
        Ok((seq << FLAG_BITS) | flags)
    }

    /// Split a word; bits above the wire width are ignored.
    pub fn unpack(word: u32) -> Self {
        Self {
            seq: (word >> FLAG_BITS) & MAX_SEQ,
            flags: word & FLAGS_MASK,
        }
    }

    pub fn word(self) -> Result<u32, EncodeError> {
        Self::pack(self.seq, self.flags)
    }
}
