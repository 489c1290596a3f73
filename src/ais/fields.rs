//! Bit-field table entries.
//!
//! Every message layout is a list of [`Field`] constants (offset, width, signedness) taken
//! from ITU-R M.1371-5. Scaling and "not available" sentinels are applied by the message
//! decoders, which keep those rules next to the table they belong to.
use super::sixbit::Bits;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub offset: usize,
    pub width: usize,
    pub signed: bool,
}

impl Field {
    pub const fn unsigned(offset: usize, width: usize) -> Self {
        Field {
            offset,
            width,
            signed: false,
        }
    }

    pub const fn signed(offset: usize, width: usize) -> Self {
        Field {
            offset,
            width,
            signed: true,
        }
    }

    /// First bit after the field.
    pub const fn end(&self) -> usize {
        self.offset + self.width
    }

    #[inline]
    pub fn read_unsigned(&self, bits: &Bits) -> u64 {
        bits.unsigned(self.offset, self.width)
    }

    /// Read honoring the field signedness.
    #[inline]
    pub fn read(&self, bits: &Bits) -> i64 {
        if self.signed {
            bits.signed(self.offset, self.width)
        } else {
            bits.unsigned(self.offset, self.width) as i64
        }
    }

    #[inline]
    pub fn read_flag(&self, bits: &Bits) -> bool {
        bits.unsigned(self.offset, self.width) != 0
    }

    /// Six-bit text; `width` must be a multiple of 6.
    #[inline]
    pub fn read_text(&self, bits: &Bits) -> String {
        bits.text(self.offset, self.width / 6)
    }
}

// Fields shared by every message type.
pub const MESSAGE_TYPE: Field = Field::unsigned(0, 6);
pub const REPEAT_INDICATOR: Field = Field::unsigned(6, 2);
pub const MMSI: Field = Field::unsigned(8, 30);
