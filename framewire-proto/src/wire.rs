//! Wire layout shared by the encoder and the decoder.
//!
//! ```text
//! ┌───────┬──────────────────┬──────────┬───────────┐
//! │ cmd   │ seq | flags      │ length   │ payload   │
//! │ 1 byte│ 2 bytes (12 | 4) │ 2 bytes  │ length    │
//! └───────┴──────────────────┴──────────┴───────────┘
//! ```
//!
//! All multi-byte integers are big-endian. Nothing outside this module should
//! hardcode a width or a bit position.

/// Width of a fixed-size unsigned field on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    U8,
    U16,
    U32,
}

impl Width {
    /// Number of bytes the field occupies.
    pub const fn bytes(self) -> usize {
        match self {
            Width::U8 => 1,
            Width::U16 => 2,
            Width::U32 => 4,
        }
    }

    /// Largest value the field can carry.
    pub const fn max(self) -> u64 {
        match self {
            Width::U8 => u8::MAX as u64,
            Width::U16 => u16::MAX as u64,
            Width::U32 => u32::MAX as u64,
        }
    }

    pub const fn fits(self, value: u64) -> bool {
        value <= self.max()
    }

    /// Big-endian bytes of `value`, truncated to this width.
    ///
    /// Callers check [`Width::fits`] first; high bytes are simply dropped.
    pub(crate) fn encode(self, value: u64) -> impl Iterator<Item = u8> {
        value.to_be_bytes().into_iter().skip(8 - self.bytes())
    }

    /// Read a big-endian value from the front of `buf`.
    ///
    /// `buf` must hold at least [`Width::bytes`] bytes.
    pub(crate) fn decode(self, buf: &[u8]) -> u64 {
        buf[..self.bytes()]
            .iter()
            .fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
    }
}

pub const CMD_WIDTH: Width = Width::U8;
pub const SEQ_FLAGS_WIDTH: Width = Width::U16;
pub const LENGTH_WIDTH: Width = Width::U16;

/// Fixed header: cmd + seq/flags word + payload length.
pub const HEADER_SIZE: usize = CMD_WIDTH.bytes() + SEQ_FLAGS_WIDTH.bytes() + LENGTH_WIDTH.bytes();

/// Low-order bits of the seq/flags word reserved for flags.
pub const FLAG_BITS: u32 = 4;
/// High-order bits of the seq/flags word carrying the sequence number.
pub const SEQ_BITS: u32 = SEQ_FLAGS_WIDTH.bytes() as u32 * 8 - FLAG_BITS;

pub const FLAGS_MASK: u32 = (1 << FLAG_BITS) - 1;
pub const MAX_SEQ: u32 = (1 << SEQ_BITS) - 1;

/// Largest payload the length prefix can describe.
pub const MAX_PAYLOAD: usize = LENGTH_WIDTH.max() as usize;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout() {
        assert_eq!(HEADER_SIZE, 5);
        assert_eq!(SEQ_BITS, 12);
        assert_eq!(MAX_SEQ, 0x0FFF);
        assert_eq!(FLAGS_MASK, 0x000F);
        assert_eq!(MAX_PAYLOAD, 65535);
    }

    #[test]
    fn big_endian() {
        assert_eq!(Width::U16.encode(0x0102).collect::<Vec<_>>(), vec![0x01, 0x02]);
        assert_eq!(Width::U32.encode(0xAABBCCDD).collect::<Vec<_>>(), vec![0xAA, 0xBB, 0xCC, 0xDD]);
        assert_eq!(Width::U8.encode(0x7F).collect::<Vec<_>>(), vec![0x7F]);
        assert_eq!(Width::U16.decode(&[0x12, 0x34, 0xFF]), 0x1234);
        assert_eq!(Width::U32.decode(&[0, 0, 1, 0]), 256);
    }

    #[test]
    fn fits() {
        assert!(Width::U8.fits(255));
        assert!(!Width::U8.fits(256));
        assert!(Width::U16.fits(65535));
        assert!(!Width::U16.fits(65536));
    }
}
