//! Controller side of the link
//!
//! Turns a register transaction into the per-tick levels a controller
//! drives onto SCLK, COPI and nCS. Data changes while SCLK is low and is held
//! through the high half, so the peripheral samples a settled bit on every
//! rising edge.

use crate::error::{Error, Result};
use crate::frame::FRAME_BITS;
use crate::pins::Pins;
use crate::shift::ADDRESS_MASK;
use crate::sync::SYNC_STAGES;

/// One 16-bit request on the link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transaction {
    rw: bool,
    address: u8,
    data: u8,
}

impl Transaction {
    pub fn new(rw: bool, address: u8, data: u8) -> Result<Self> {
        if address & !ADDRESS_MASK != 0 {
            return Err(Error::AddressOutOfRange(address));
        }
        Ok(Self { rw, address, data })
    }

    /// Write request (read/write bit set).
    pub fn write(address: u8, data: u8) -> Result<Self> {
        Self::new(true, address, data)
    }

    /// Read request. The peripheral has no read path, the frame still
    /// carries a payload.
    pub fn read(address: u8, data: u8) -> Result<Self> {
        Self::new(false, address, data)
    }

    pub fn rw(&self) -> bool {
        self.rw
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn data(&self) -> u8 {
        self.data
    }

    /// Frame word as sent, MSB first.
    pub fn word(&self) -> u16 {
        (self.rw as u16) << 15 | (self.address as u16) << 8 | self.data as u16
    }

    /// Frame bits in transmission order.
    pub fn bits(&self) -> impl Iterator<Item = bool> + use<> {
        let word = self.word();
        (0..FRAME_BITS).rev().map(move |i| word >> i & 1 != 0)
    }
}

/// Tick counts that shape a transaction waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkTiming {
    /// Ticks SCLK stays at each level.
    pub half_period: usize,
    /// Ticks between nCS falling and the first clock half.
    pub cs_setup: usize,
    /// Ticks the link is left idle after nCS rises.
    pub trailing_idle: usize,
    /// Emit the arming clock edge before the frame bits.
    pub lead_in: bool,
}

impl LinkTiming {
    pub fn validate(&self) -> Result<()> {
        // SCLK must run at most a quarter of the local clock rate.
        if self.half_period < 2 {
            return Err(Error::InvalidTiming(
                "SCLK half period must span at least 2 ticks",
            ));
        }
        // nCS high reaches the frame state machine SYNC_STAGES ticks late.
        if self.trailing_idle <= SYNC_STAGES {
            return Err(Error::InvalidTiming(
                "nCS must stay high for at least 3 ticks after a frame",
            ));
        }
        Ok(())
    }
}

impl Default for LinkTiming {
    fn default() -> Self {
        Self {
            half_period: 50,
            cs_setup: 1,
            trailing_idle: 600,
            lead_in: true,
        }
    }
}

/// Per-tick pin levels for one transaction
#[derive(Debug, Clone)]
pub struct Waveform {
    levels: Vec<Pins>,
}

impl Waveform {
    /// Full frame: lead-in (if enabled) plus all 16 bits.
    pub fn transaction(tx: &Transaction, timing: &LinkTiming) -> Self {
        Self::truncated(tx, timing, usize::MAX)
    }

    /// Frame cut short after `pulses` rising edges, lead-in included.
    pub fn truncated(tx: &Transaction, timing: &LinkTiming, pulses: usize) -> Self {
        let lead_in = timing.lead_in.then_some(false);
        let bits = lead_in.into_iter().chain(tx.bits()).take(pulses);

        let mut levels = Vec::new();
        let mut pins = Pins {
            sclk: false,
            copi: false,
            ncs: false,
        };
        levels.extend(std::iter::repeat_n(pins, timing.cs_setup));

        for bit in bits {
            pins.sclk = false;
            pins.copi = bit;
            levels.extend(std::iter::repeat_n(pins, timing.half_period));
            pins.sclk = true;
            levels.extend(std::iter::repeat_n(pins, timing.half_period));
        }

        levels.extend(std::iter::repeat_n(Pins::IDLE, timing.trailing_idle));
        Self { levels }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn rising_edges(&self) -> usize {
        self.levels
            .windows(2)
            .filter(|pair| !pair[0].sclk && pair[1].sclk)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = Pins> + '_ {
        self.levels.iter().copied()
    }
}

impl IntoIterator for Waveform {
    type Item = Pins;
    type IntoIter = std::vec::IntoIter<Pins>;

    fn into_iter(self) -> Self::IntoIter {
        self.levels.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing() -> LinkTiming {
        LinkTiming {
            half_period: 3,
            cs_setup: 1,
            trailing_idle: 5,
            lead_in: true,
        }
    }

    #[test]
    fn rejects_wide_address() {
        assert!(matches!(
            Transaction::write(0x80, 0),
            Err(Error::AddressOutOfRange(0x80))
        ));
        assert!(Transaction::write(0x7F, 0).is_ok());
    }

    #[test]
    fn word_layout() {
        let tx = Transaction::write(0x30, 0xAA).unwrap();
        assert_eq!(tx.word(), 0b1_0110000_10101010);
        let bits: Vec<bool> = tx.bits().collect();
        assert_eq!(bits.len(), 16);
        assert!(bits[0]);
        assert!(!bits[1]);
        assert!(bits[2]);
        assert!(!bits[15]);
    }

    #[test]
    fn waveform_shape() {
        let tx = Transaction::read(0x01, 0xFF).unwrap();
        let wave = Waveform::transaction(&tx, &timing());
        assert_eq!(wave.len(), 1 + 17 * 2 * 3 + 5);
        assert_eq!(wave.rising_edges(), 17);
        let levels: Vec<Pins> = wave.iter().collect();
        assert!(!levels[0].ncs);
        assert!(levels[..levels.len() - 5].iter().all(|pins| !pins.ncs));
        assert!(levels[levels.len() - 5..].iter().all(|&pins| pins == Pins::IDLE));
    }

    #[test]
    fn data_is_stable_while_clock_is_high() {
        let tx = Transaction::write(0x55, 0x0F).unwrap();
        let wave = Waveform::transaction(&tx, &timing());
        let levels: Vec<Pins> = wave.into_iter().collect();
        for pair in levels.windows(2) {
            if pair[0].sclk && pair[1].sclk {
                assert_eq!(pair[0].copi, pair[1].copi);
            }
        }
    }

    #[test]
    fn truncation_counts_lead_in() {
        let tx = Transaction::write(0x02, 0x55).unwrap();
        let wave = Waveform::truncated(&tx, &timing(), 8);
        assert_eq!(wave.rising_edges(), 8);

        let no_lead_in = LinkTiming {
            lead_in: false,
            ..timing()
        };
        assert_eq!(Waveform::transaction(&tx, &no_lead_in).rising_edges(), 16);
    }

    #[test]
    fn timing_rejects_unsynchronizable_clock() {
        let fast = LinkTiming {
            half_period: 1,
            ..LinkTiming::default()
        };
        assert!(matches!(fast.validate(), Err(Error::InvalidTiming(_))));
        assert!(LinkTiming::default().validate().is_ok());
    }
}
