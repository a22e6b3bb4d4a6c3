//! framewire wire protocol - frame types, byte writer and codec
//!
//! A frame is a 1 byte opcode, a 2 byte word packing a 12 bit sequence number
//! with 4 flag bits, and a length-prefixed payload. See [`wire`] for the exact
//! layout.
//!
//! ```
//! use framewire_proto::{Frame, decode, encode};
//!
//! let frame = Frame::new(0x01, 0x0005, vec![0xAA, 0xBB, 0xCC]);
//! let bytes = encode(&frame).unwrap();
//! assert_eq!(bytes, [0x01, 0x00, 0x05, 0x00, 0x03, 0xAA, 0xBB, 0xCC]);
//! assert_eq!(decode(&bytes).unwrap(), (frame, 8));
//! ```

pub mod codec;
pub mod error;
pub mod frame;
pub mod framer;
pub mod wire;
pub mod writer;

pub use codec::{Codec, FrameLimits, Header};
pub use error::{DecodeError, EncodeError, Field, Overflow, PatchError};
pub use frame::{Frame, SeqFlags};
pub use framer::FrameBuffer;
pub use writer::{ByteWriter, Value, VecWriter};

/// Encode `frame` with the default limits.
pub fn encode(frame: &Frame) -> Result<Vec<u8>, EncodeError> {
    Codec::default().encode(frame)
}

/// Decode one frame from the front of `buf` with the default limits.
///
/// Returns the frame and the number of bytes it occupied.
pub fn decode(buf: &[u8]) -> Result<(Frame, usize), DecodeError> {
    Codec::default().decode(buf)
}

/// Async frame operations for tokio
#[cfg(feature = "async")]
pub mod async_io {
    use super::*;
    use std::io;
    use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

    use crate::wire::HEADER_SIZE;

    pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, frame: &Frame) -> io::Result<()> {
        let bytes = encode(frame)?;
        writer.write_all(&bytes).await?;
        writer.flush().await?;
        Ok(())
    }

    pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> io::Result<Frame> {
        read_frame_with(reader, &Codec::default()).await
    }

    /// Like [`read_frame`], enforcing `codec`'s payload limit before the
    /// payload is read.
    pub async fn read_frame_with<R: AsyncRead + Unpin>(
        reader: &mut R,
        codec: &Codec,
    ) -> io::Result<Frame> {
        let mut header = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header).await?;
        let header = codec.header(&header)?;

        let mut payload = vec![0u8; header.payload_len];
        reader.read_exact(&mut payload).await?;

        Ok(Frame::new(header.cmd, header.seq_and_flags, payload))
    }

}
