//! Six-bit ASCII armor and bit-field extraction.
//!
//! AIS payloads are carried as printable characters, each holding 6 bits:
//!
//! * armor value = `char - 48`, minus another 8 when the result exceeds 40, which maps
//!   `'0'..='W'` to `0..=39` and `` '`'..='w' `` to `40..=63`;
//! * text fields inside the payload use a different table: `0..=31` → `'@'..='_'`,
//!   `32..=63` → `' '..='?'`.
//!
//! [`Bits`] stores the decoded payload packed in bytes and exposes total extraction
//! primitives: reading past the end yields zero bits instead of failing.
use crate::ais_errors::AisError;

/// Armor character → 6-bit value.
#[inline]
pub fn armor_value(c: char) -> Result<u8, AisError> {
    match c {
        '0'..='W' => Ok(c as u8 - 48),
        '`'..='w' => Ok(c as u8 - 56),
        _ => Err(AisError::InvalidArmorCharacter(c)),
    }
}

/// 6-bit value → AIS text character.
#[inline]
pub fn text_char(value: u8) -> char {
    let value = value & 0x3F;
    if value < 32 {
        (value + 64) as char
    } else {
        value as char
    }
}

/// Decoded payload bit sequence (most significant bit first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bits {
    bytes: Vec<u8>,
    len: usize,
}

impl Bits {
    /// Decode an armored payload.
    ///
    /// Arguments
    /// -----------------
    /// * `payload` – Six-bit armored characters.
    /// * `fill_bits` – Number of padding bits to drop at the tail (0–5).
    ///
    /// Return
    /// ----------
    /// * A bit sequence of length `6 × payload.len() − fill_bits`, or
    ///   [`AisError::InvalidArmorCharacter`] / [`AisError::InvalidFillBits`].
    pub fn from_armor(payload: &str, fill_bits: u8) -> Result<Bits, AisError> {
        if fill_bits > 5 {
            return Err(AisError::InvalidFillBits(fill_bits));
        }

        let mut bytes = Vec::with_capacity((payload.len() * 6).div_ceil(8));
        let mut acc: u32 = 0;
        let mut pending = 0u32;
        let mut chars = 0usize;
        for c in payload.chars() {
            acc = (acc << 6) | u32::from(armor_value(c)?);
            pending += 6;
            chars += 1;
            if pending >= 8 {
                pending -= 8;
                bytes.push((acc >> pending) as u8);
                acc &= (1 << pending) - 1;
            }
        }
        if pending > 0 {
            bytes.push((acc << (8 - pending)) as u8);
        }

        let len = (chars * 6).saturating_sub(usize::from(fill_bits));
        Ok(Bits { bytes, len })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bit at `index`; zero beyond the end.
    #[inline]
    pub fn bit(&self, index: usize) -> bool {
        index < self.len && (self.bytes[index / 8] >> (7 - index % 8)) & 1 == 1
    }

    /// Unsigned big-endian integer of `width` bits (at most 64) starting at `offset`.
    pub fn unsigned(&self, offset: usize, width: usize) -> u64 {
        debug_assert!(width <= 64);
        (offset..offset + width).fold(0u64, |acc, i| (acc << 1) | u64::from(self.bit(i)))
    }

    /// Two's complement integer of `width` bits starting at `offset`.
    pub fn signed(&self, offset: usize, width: usize) -> i64 {
        if width == 0 {
            return 0;
        }
        let raw = self.unsigned(offset, width);
        let shift = 64 - width as u32;
        ((raw << shift) as i64) >> shift
    }

    /// `chars` six-bit text characters starting at `offset`, trailing `@` and spaces removed.
    pub fn text(&self, offset: usize, chars: usize) -> String {
        let s: String = (0..chars)
            .map(|i| text_char(self.unsigned(offset + 6 * i, 6) as u8))
            .collect();
        s.trim_end_matches(['@', ' ']).to_string()
    }
}

#[cfg(test)]
mod test_sixbit {
    use super::*;

    #[test]
    fn test_armor_table_bounds() {
        assert_eq!(armor_value('0').unwrap(), 0);
        assert_eq!(armor_value('W').unwrap(), 39);
        assert_eq!(armor_value('`').unwrap(), 40);
        assert_eq!(armor_value('w').unwrap(), 63);
        assert_eq!(armor_value('X'), Err(AisError::InvalidArmorCharacter('X')));
        assert_eq!(armor_value('x'), Err(AisError::InvalidArmorCharacter('x')));
        assert_eq!(armor_value(' '), Err(AisError::InvalidArmorCharacter(' ')));
    }

    #[test]
    fn test_length_and_fill_bits() {
        assert_eq!(Bits::from_armor("18JSad001i5gcaArTICimQTT068t", 0).unwrap().len(), 168);
        assert_eq!(Bits::from_armor("0", 0).unwrap().len(), 6);
        assert_eq!(Bits::from_armor("000", 2).unwrap().len(), 16);
        assert!(Bits::from_armor("", 0).unwrap().is_empty());
        assert_eq!(Bits::from_armor("0", 6), Err(AisError::InvalidFillBits(6)));
    }

    #[test]
    fn test_unsigned_and_signed_fields() {
        // 'w' = 111111, '0' = 000000, '1' = 000001
        let bits = Bits::from_armor("w01", 0).unwrap();
        assert_eq!(bits.unsigned(0, 6), 63);
        assert_eq!(bits.unsigned(0, 8), 0b1111_1100);
        assert_eq!(bits.signed(0, 6), -1);
        assert_eq!(bits.signed(0, 7), -2);
        assert_eq!(bits.unsigned(12, 6), 1);
        assert_eq!(bits.signed(12, 6), 1);
        // past the end reads as zero
        assert_eq!(bits.unsigned(16, 8), 0b0100_0000);
        assert_eq!(bits.unsigned(100, 30), 0);
    }

    #[test]
    fn test_fill_bits_are_not_readable() {
        let bits = Bits::from_armor("w", 2).unwrap();
        assert_eq!(bits.len(), 4);
        assert_eq!(bits.unsigned(0, 6), 0b111100);
    }

    #[test]
    fn test_text() {
        assert_eq!(text_char(0), '@');
        assert_eq!(text_char(1), 'A');
        assert_eq!(text_char(32), ' ');
        assert_eq!(text_char(48), '0');
        // "H" = 8 → armor '8'; "I" = 9 → armor '9'; then '@' padding
        let bits = Bits::from_armor("8900", 0).unwrap();
        assert_eq!(bits.text(0, 4), "HI");
    }
}
