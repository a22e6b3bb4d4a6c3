//! Turns a byte stream that arrives in arbitrary chunks into frames.

use std::io::{self, Read};

use crate::codec::Codec;
use crate::error::DecodeError;
use crate::frame::Frame;

/// Bytes pulled from a reader per [`FrameBuffer::read_from`] call.
pub const READ_CHUNK: usize = 1024;

/// Accumulates transport bytes and yields complete frames in order.
///
/// Partial frames stay buffered until the rest arrives. A malformed frame is
/// reported and left in place; the stream cannot be trusted after that, so
/// the caller should [`clear`](FrameBuffer::clear) or drop the connection.
///
/// Consumed bytes are skipped with a read offset and only compacted once they
/// make up at least half the buffer, so draining is linear in the input.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    buf: Vec<u8>,
    // start of the first byte not yet returned as part of a frame
    pos: usize,
    codec: Codec,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_codec(codec: Codec) -> Self {
        Self {
            buf: Vec::new(),
            pos: 0,
            codec,
        }
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.compact();
        self.buf.extend_from_slice(bytes);
    }

    /// Pop the next complete frame, if there is one.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, DecodeError> {
        match self.codec.decode(&self.buf[self.pos..]) {
            Ok((frame, consumed)) => {
                self.pos += consumed;
                if self.pos == self.buf.len() {
                    self.clear();
                }
                log::trace!("{frame}, {} bytes pending", self.len());
                Ok(Some(frame))
            }
            Err(e) if e.is_recoverable() => Ok(None),
            Err(e) => {
                log::warn!("{e}, {} bytes buffered", self.len());
                Err(e)
            }
        }
    }

    /// Pop every complete frame currently buffered.
    pub fn frames(&mut self) -> Result<Vec<Frame>, DecodeError> {
        let mut frames = Vec::new();
        while let Some(frame) = self.next_frame()? {
            frames.push(frame);
        }
        Ok(frames)
    }

    /// Pull one chunk from `reader` into the buffer. Returns the number of
    /// bytes read; 0 means the reader is at EOF.
    pub fn read_from<R: Read>(&mut self, reader: &mut R) -> io::Result<usize> {
        let mut chunk = [0u8; READ_CHUNK];
        let n = reader.read(&mut chunk)?;
        self.extend(&chunk[..n]);
        Ok(n)
    }

    /// Read `reader` to EOF, handing each frame to `on_frame` as soon as it
    /// is complete.
    ///
    /// A malformed frame stops the loop with `InvalidData`. EOF in the middle
    /// of a frame is `UnexpectedEof`; the partial bytes stay in the buffer.
    pub fn read_frames<R, F>(&mut self, reader: &mut R, mut on_frame: F) -> io::Result<()>
    where
        R: Read,
        F: FnMut(Frame),
    {
        loop {
            while let Some(frame) = self.next_frame()? {
                on_frame(frame);
            }
            match self.read_from(reader) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }

        if self.is_empty() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("stream ended with {} bytes of a partial frame", self.len()),
            ))
        }
    }

    /// Bytes received but not yet part of a returned frame.
    pub fn pending(&self) -> &[u8] {
        &self.buf[self.pos..]
    }

    pub fn len(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.pos = 0;
    }

    fn compact(&mut self) {
        if self.pos > 0 && self.pos * 2 >= self.buf.len() {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::FrameLimits;

    fn wire(frames: &[Frame]) -> Vec<u8> {
        let codec = Codec::default();
        frames
            .iter()
            .flat_map(|f| codec.encode(f).unwrap())
            .collect()
    }

    fn frames() -> Vec<Frame> {
        vec![
            Frame::with_seq(1, 0, 0, b"one".to_vec()).unwrap(),
            Frame::with_seq(2, 1, 0b0001, vec![]).unwrap(),
            Frame::with_seq(3, 2, 0b0010, vec![7; 300]).unwrap(),
        ]
    }

    #[test]
    fn byte_at_a_time() {
        let expected = frames();
        let mut fb = FrameBuffer::new();
        let mut got = Vec::new();
        for b in wire(&expected) {
            fb.extend(&[b]);
            if let Some(frame) = fb.next_frame().unwrap() {
                got.push(frame);
            }
        }
        assert_eq!(got, expected);
        assert!(fb.is_empty());
    }

    #[test]
    fn partial_tail_is_kept() {
        let expected = frames();
        let bytes = wire(&expected);
        let cut = bytes.len() - 10;

        let mut fb = FrameBuffer::new();
        fb.extend(&bytes[..cut]);
        assert_eq!(fb.frames().unwrap(), expected[..2]);
        assert_eq!(fb.pending(), &bytes[bytes.len() - expected[2].encoded_len()..cut]);

        fb.extend(&bytes[cut..]);
        assert_eq!(fb.frames().unwrap(), expected[2..]);
        assert_eq!(fb.len(), 0);
    }

    #[test]
    fn malformed_keeps_bytes() {
        let mut fb = FrameBuffer::with_codec(Codec::new(FrameLimits { max_payload: 8 }));
        fb.extend(&[0x01, 0x00, 0x00, 0x00, 0x09]);
        assert!(matches!(fb.next_frame(), Err(DecodeError::Malformed { .. })));
        assert_eq!(fb.len(), 5);
        fb.clear();
        assert_eq!(fb.next_frame(), Ok(None));
    }

    #[test]
    fn reads_in_chunks() {
        let expected = vec![
            Frame::new(1, 0, vec![1; 1500]),
            Frame::new(2, 0, vec![2; 10]),
        ];
        let mut reader = io::Cursor::new(wire(&expected));
        let mut fb = FrameBuffer::new();
        let mut got = Vec::new();
        loop {
            let n = fb.read_from(&mut reader).unwrap();
            assert!(n <= READ_CHUNK);
            got.extend(fb.frames().unwrap());
            if n == 0 {
                break;
            }
        }
        assert_eq!(got, expected);
        assert!(fb.is_empty());
    }

    #[test]
    fn drains_large_batch() {
        let count = 100_000;
        let mut bytes = Vec::new();
        for i in 0..count {
            let frame = Frame::with_seq(i % 256, i % 4096, i % 16, vec![]).unwrap();
            Codec::default().encode_into(&frame, &mut bytes).unwrap();
        }
        let tail = Codec::default().encode(&Frame::new(9, 0, vec![1, 2, 3])).unwrap();
        bytes.extend_from_slice(&tail[..6]);

        let mut fb = FrameBuffer::new();
        fb.extend(&bytes);
        let frames = fb.frames().unwrap();
        assert_eq!(frames.len(), count as usize);
        assert_eq!(frames[12345].seq(), 12345 % 4096);
        assert_eq!(fb.pending(), &tail[..6]);

        // the consumed prefix is dropped once more bytes arrive
        fb.extend(&tail[6..]);
        assert_eq!(fb.pending(), &tail[..]);
        assert_eq!(fb.next_frame().unwrap(), Some(Frame::new(9, 0, vec![1, 2, 3])));
        assert!(fb.is_empty());
    }

    #[test]
    fn read_frames_to_eof() {
        let expected = frames();
        let mut reader = io::Cursor::new(wire(&expected));
        let mut got = Vec::new();
        FrameBuffer::new()
            .read_frames(&mut reader, |f| got.push(f))
            .unwrap();
        assert_eq!(got, expected);
    }

    #[test]
    fn read_frames_reports_truncation() {
        let expected = frames();
        let mut bytes = wire(&expected);
        bytes.truncate(bytes.len() - 1);

        let mut fb = FrameBuffer::new();
        let mut got = Vec::new();
        let err = fb
            .read_frames(&mut io::Cursor::new(bytes), |f| got.push(f))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(got, expected[..2]);
        assert_eq!(fb.len(), expected[2].encoded_len() - 1);
    }

    #[test]
    fn read_frames_stops_on_malformed() {
        let mut fb = FrameBuffer::with_codec(Codec::new(FrameLimits { max_payload: 2 }));
        let mut reader = io::Cursor::new(vec![0x01, 0x00, 0x00, 0x00, 0x03, 1, 2, 3]);
        let err = fb.read_frames(&mut reader, |_| {}).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
