use std::ops::RangeInclusive;

/// Bit helpers for register bytes.
/// The index (`bit_idx`) goes from lsb to msb (right to left).
pub trait Bits: Copy {
    fn is_bit_on(self, bit_idx: u8) -> bool;

    fn set_bit_on(&mut self, bit_idx: u8);

    fn set_bit_off(&mut self, bit_idx: u8);

    fn set_bit(&mut self, bit_idx: u8, value: bool) {
        if value {
            self.set_bit_on(bit_idx);
        } else {
            self.set_bit_off(bit_idx);
        }
    }

    fn get_bits(self, bits_range: RangeInclusive<u8>) -> Self;
}

impl Bits for u8 {
    fn is_bit_on(self, bit_idx: u8) -> bool {
        debug_assert!(bit_idx < 8);
        self & (1 << bit_idx) != 0
    }

    fn set_bit_on(&mut self, bit_idx: u8) {
        debug_assert!(bit_idx < 8);
        *self |= 1 << bit_idx;
    }

    fn set_bit_off(&mut self, bit_idx: u8) {
        debug_assert!(bit_idx < 8);
        *self &= !(1 << bit_idx);
    }

    fn get_bits(self, bits_range: RangeInclusive<u8>) -> Self {
        let start = *bits_range.start();
        let length = bits_range.len();

        // `length` ones, moved to the start of the range.
        let mask = if length >= 8 {
            0xFF
        } else {
            ((1_u16 << length) - 1) as Self
        };

        (self >> start) & mask
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Bits;

    #[test]
    fn test_is_bit_on() {
        let b: u8 = 0b0100_0001;
        assert!(b.is_bit_on(0));
        assert!(b.is_bit_on(6));
        assert!(!b.is_bit_on(1));
        assert!(!b.is_bit_on(7));
    }

    #[test]
    fn test_set_bit_on_off() {
        let mut b: u8 = 0;
        b.set_bit_on(3);
        assert_eq!(b, 0b0000_1000);

        b.set_bit_on(3);
        assert_eq!(b, 0b0000_1000);

        b.set_bit_off(3);
        assert_eq!(b, 0);

        // clearing an already clear bit leaves the byte alone
        b.set_bit_off(5);
        assert_eq!(b, 0);
    }

    #[test]
    fn test_set_bit() {
        let mut b: u8 = 0b1010_1010;
        b.set_bit(0, true);
        b.set_bit(1, false);
        assert_eq!(b, 0b1010_1001);
    }

    #[test]
    fn test_get_bits() {
        let b: u8 = 0b0111_1110;
        assert_eq!(b.get_bits(1..=6), 0b11_1111);
        assert_eq!(b.get_bits(0..=0), 0);
        assert_eq!(b.get_bits(0..=7), b);
        assert_eq!(b.get_bits(4..=7), 0b0111);
    }
}
