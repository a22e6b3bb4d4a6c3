//! Frame encoder and decoder.

use std::io;

use crate::error::{DecodeError, EncodeError, Field, Overflow};
use crate::frame::Frame;
use crate::wire::{CMD_WIDTH, HEADER_SIZE, LENGTH_WIDTH, MAX_PAYLOAD, SEQ_FLAGS_WIDTH, Width};
use crate::writer::{ByteWriter, Value, VecWriter};

/// Decoder-side sanity limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FrameLimits {
    /// Largest payload accepted. Anything declared above this is treated as
    /// corruption rather than a slow sender. Clamped to [`MAX_PAYLOAD`].
    pub max_payload: usize,
}

impl Default for FrameLimits {
    fn default() -> Self {
        Self {
            max_payload: MAX_PAYLOAD,
        }
    }
}

/// Parsed fixed-size frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub cmd: u32,
    pub seq_and_flags: u32,
    pub payload_len: usize,
}

impl Header {
    /// Parse the header at the front of `buf`. Checks nothing but length.
    pub fn parse(buf: &[u8]) -> Result<Self, DecodeError> {
        if buf.len() < HEADER_SIZE {
            return Err(DecodeError::Incomplete {
                needed: HEADER_SIZE,
                available: buf.len(),
            });
        }

        let mut pos = 0;
        let mut next = |width: Width| {
            let v = width.decode(&buf[pos..]);
            pos += width.bytes();
            v
        };

        // decoded values are bounded by their widths, all of which fit u32
        Ok(Self {
            cmd: next(CMD_WIDTH) as u32,
            seq_and_flags: next(SEQ_FLAGS_WIDTH) as u32,
            payload_len: next(LENGTH_WIDTH) as usize,
        })
    }

    /// Header plus payload.
    pub fn frame_len(&self) -> usize {
        HEADER_SIZE + self.payload_len
    }
}

/// Encodes frames to and decodes frames from the wire format in [`crate::wire`].
///
/// Stateless; copy it freely between threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Codec {
    limits: FrameLimits,
}

impl Codec {
    pub fn new(limits: FrameLimits) -> Self {
        Self {
            limits: FrameLimits {
                max_payload: limits.max_payload.min(MAX_PAYLOAD),
            },
        }
    }

    pub fn max_payload(&self) -> usize {
        self.limits.max_payload
    }

    /// Validate every field of `frame` without writing anything.
    pub fn check(&self, frame: &Frame) -> Result<(), EncodeError> {
        fits(Field::Cmd, CMD_WIDTH, frame.cmd.into())?;
        fits(Field::SeqAndFlags, SEQ_FLAGS_WIDTH, frame.seq_and_flags.into())?;
        fits(Field::PayloadLength, LENGTH_WIDTH, frame.data.len() as u64)?;
        if frame.data.len() > self.limits.max_payload {
            return Err(EncodeError::PayloadTooLarge {
                len: frame.data.len(),
                limit: self.limits.max_payload,
            });
        }
        Ok(())
    }

    /// Encode `frame` into a fresh buffer.
    pub fn encode(&self, frame: &Frame) -> Result<Vec<u8>, EncodeError> {
        let mut writer = VecWriter::with_capacity(frame.encoded_len());
        self.encode_into(frame, &mut writer)?;
        Ok(writer.into_inner())
    }

    /// Append `frame` to `writer`, returning the number of bytes written.
    ///
    /// The whole frame is validated first; on error `writer` is untouched.
    pub fn encode_into<W: ByteWriter + ?Sized>(
        &self,
        frame: &Frame,
        writer: &mut W,
    ) -> Result<usize, EncodeError> {
        self.check(frame)?;

        let start = writer.len();
        writer
            .write(Value::uint(CMD_WIDTH, frame.cmd))
            .map_err(overflow(Field::Cmd))?;
        writer
            .write(Value::uint(SEQ_FLAGS_WIDTH, frame.seq_and_flags))
            .map_err(overflow(Field::SeqAndFlags))?;
        writer
            .write(Value::uint(LENGTH_WIDTH, frame.data.len() as u64))
            .map_err(overflow(Field::PayloadLength))?;
        writer
            .write(Value::Bytes(&frame.data))
            .map_err(overflow(Field::PayloadLength))?;

        Ok(writer.len() - start)
    }

    /// Parse and sanity-check the header at the front of `buf`.
    pub fn header(&self, buf: &[u8]) -> Result<Header, DecodeError> {
        let header = Header::parse(buf)?;
        if header.payload_len > self.limits.max_payload {
            return Err(DecodeError::Malformed {
                declared: header.payload_len,
                limit: self.limits.max_payload,
            });
        }
        Ok(header)
    }

    /// Decode one frame from the front of `buf`.
    ///
    /// Returns the frame and the bytes consumed; anything after that belongs
    /// to the next frame. The payload is copied out of `buf`.
    pub fn decode(&self, buf: &[u8]) -> Result<(Frame, usize), DecodeError> {
        let header = self.header(buf)?;
        let total = header.frame_len();
        if buf.len() < total {
            return Err(DecodeError::Incomplete {
                needed: total,
                available: buf.len(),
            });
        }

        let data = buf[HEADER_SIZE..total].to_vec();
        Ok((Frame::new(header.cmd, header.seq_and_flags, data), total))
    }

    pub fn write_to<W: io::Write>(&self, frame: &Frame, writer: &mut W) -> io::Result<()> {
        let bytes = self.encode(frame)?;
        writer.write_all(&bytes)
    }

    pub fn read_from<R: io::Read>(&self, reader: &mut R) -> io::Result<Frame> {
        let mut header = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header)?;
        let header = self.header(&header)?;

        let mut payload = vec![0u8; header.payload_len];
        reader.read_exact(&mut payload)?;

        Ok(Frame::new(header.cmd, header.seq_and_flags, payload))
    }
}

fn overflow(field: Field) -> impl FnOnce(Overflow) -> EncodeError {
    move |source| EncodeError::FieldOverflow { field, source }
}

fn fits(field: Field, width: Width, value: u64) -> Result<(), EncodeError> {
    if width.fits(value) {
        Ok(())
    } else {
        Err(overflow(field)(Overflow {
            value,
            max: width.max(),
        }))
    }
}
