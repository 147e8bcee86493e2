use crate::frame::BitCount;

pub const ADDRESS_MASK: u8 = 0x7F;

/// Which frame field a sampled bit lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// First pulse after frame start; only advances the counter.
    Bootstrap,
    ReadWrite,
    Address,
    Payload,
}

impl Field {
    pub fn for_count(count: BitCount) -> Self {
        match count.get() {
            0 => Field::Bootstrap,
            1 => Field::ReadWrite,
            2..=8 => Field::Address,
            _ => Field::Payload,
        }
    }
}

/// Serial-to-parallel capture of the read/write flag, address and payload
///
/// The fields are never cleared between frames: a new frame shifts into
/// whatever the previous one left behind.
#[derive(Debug, Clone, Default)]
pub struct FieldShiftRegister {
    rw: bool,
    address: u8,
    payload: u8,
}

impl FieldShiftRegister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rw(&self) -> bool {
        self.rw
    }

    /// 7-bit register address.
    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn payload(&self) -> u8 {
        self.payload
    }

    /// Store `bit` into the field selected by the pre-increment counter value.
    pub fn capture(&mut self, count: BitCount, bit: bool) -> Field {
        let field = Field::for_count(count);
        match field {
            Field::Bootstrap => {}
            Field::ReadWrite => self.rw = bit,
            Field::Address => self.address = ((self.address << 1) | bit as u8) & ADDRESS_MASK,
            Field::Payload => self.payload = (self.payload << 1) | bit as u8,
        }
        field
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shift_in(reg: &mut FieldShiftRegister, first_count: u8, bits: &[bool]) {
        for (offset, &bit) in bits.iter().enumerate() {
            reg.capture(BitCount::new(first_count + offset as u8), bit);
        }
    }

    fn bits_of(value: u8, width: u32) -> Vec<bool> {
        (0..width).rev().map(|i| value >> i & 1 != 0).collect()
    }

    #[test]
    fn field_selection_by_count() {
        assert_eq!(Field::for_count(BitCount::ZERO), Field::Bootstrap);
        assert_eq!(Field::for_count(BitCount::new(1)), Field::ReadWrite);
        assert_eq!(Field::for_count(BitCount::new(2)), Field::Address);
        assert_eq!(Field::for_count(BitCount::new(8)), Field::Address);
        assert_eq!(Field::for_count(BitCount::new(9)), Field::Payload);
        assert_eq!(Field::for_count(BitCount::FULL), Field::Payload);
    }

    #[test]
    fn bootstrap_pulse_touches_nothing() {
        let mut reg = FieldShiftRegister::new();
        reg.capture(BitCount::ZERO, true);
        assert!(!reg.rw());
        assert_eq!(reg.address(), 0);
        assert_eq!(reg.payload(), 0);
    }

    #[test]
    fn msb_first_capture() {
        let mut reg = FieldShiftRegister::new();
        shift_in(&mut reg, 1, &[true]);
        shift_in(&mut reg, 2, &bits_of(0x2A, 7));
        shift_in(&mut reg, 9, &bits_of(0xA5, 8));
        assert!(reg.rw());
        assert_eq!(reg.address(), 0x2A);
        assert_eq!(reg.payload(), 0xA5);
    }

    #[test]
    fn rw_is_overwritten_not_shifted() {
        let mut reg = FieldShiftRegister::new();
        reg.capture(BitCount::new(1), true);
        reg.capture(BitCount::new(1), false);
        assert!(!reg.rw());
    }

    #[test]
    fn partial_shift_keeps_previous_bits() {
        let mut reg = FieldShiftRegister::new();
        shift_in(&mut reg, 2, &bits_of(0x41, 7));
        shift_in(&mut reg, 2, &[false, true]);
        // 0b100_0001 shifted left twice within 7 bits, then 0b01 appended
        assert_eq!(reg.address(), 0b000_0101);
    }
}
