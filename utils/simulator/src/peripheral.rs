use log::{debug, trace};

use crate::edge::{EdgeDetector, Edges};
use crate::frame::{FrameState, FrameVerdict};
use crate::pins::{Inputs, Pins};
use crate::register_file::{Register, RegisterFile};
use crate::shift::{Field, FieldShiftRegister};
use crate::sync::Synchronizer;

/// Everything the peripheral exposes after one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outputs {
    pub edges: Edges,
    /// Set on the tick a frame is closed by nCS returning high.
    pub frame_end: Option<FrameVerdict>,
    pub registers: RegisterFile,
}

/// SPI register-bank peripheral
///
/// Write-only SPI target feeding five configuration registers. The model is
/// cycle based: [`SpiPeripheral::advance`] is one rising edge of the local
/// clock. Every next-state value is computed from the state left by the
/// previous tick, so the order of the updates inside `advance` does not leak
/// into the results.
///
/// Frame layout, MSB first, sampled on SCLK rising edges while nCS is low:
/// one read/write bit, a 7-bit address and an 8-bit payload. The first
/// rising edge after nCS falls only arms the bit counter, so a controller
/// has to clock 17 edges to land all 16 bits.
///
/// Register loads are not gated on frame validity or the read/write bit:
/// whenever the address field selects a register, that register follows the
/// payload field.
#[derive(Debug, Clone, Default)]
pub struct SpiPeripheral {
    sync: Synchronizer,
    edges: EdgeDetector,
    frame: FrameState,
    fields: FieldShiftRegister,
    registers: RegisterFile,
}

impl SpiPeripheral {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, inputs: Inputs) -> Outputs {
        if !inputs.reset_n {
            self.clear();
            return Outputs {
                edges: Edges::default(),
                frame_end: None,
                registers: self.registers,
            };
        }

        let synced = self.sync.output();
        let edges = self.edges.detect(synced);

        // Decode reads the fields as they were before this tick's capture.
        let address = self.fields.address();
        let payload = self.fields.payload();
        if let Some(reg) = Register::from_address(address) {
            if self.registers.get(reg) != payload {
                debug!("{} <= 0x{:02x}", reg, payload);
            }
            self.registers.load(address, payload);
        }

        if edges.frame_start {
            debug!("frame start");
        }
        let step = self.frame.step(edges, synced.ncs);
        if let Some(count) = step.sampled {
            let field = self.fields.capture(count, synced.copi);
            if field != Field::Bootstrap {
                trace!("bit {} = {} -> {:?}", count.get(), synced.copi as u8, field);
            }
        }
        if let Some(verdict) = step.verdict {
            debug!(
                "frame end: {} bits, {} (rw={} address=0x{:02x} payload=0x{:02x})",
                verdict.bits,
                if verdict.valid { "valid" } else { "dropped" },
                self.fields.rw() as u8,
                self.fields.address(),
                self.fields.payload()
            );
        }

        self.edges.update(synced);
        self.sync.shift(inputs.pins);

        Outputs {
            edges,
            frame_end: step.verdict,
            registers: self.registers,
        }
    }

    /// Synchronous reset: every register, pipeline stage and field to zero.
    pub fn clear(&mut self) {
        self.sync.clear();
        self.edges.clear();
        self.frame.clear();
        self.fields.clear();
        self.registers.clear();
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn frame(&self) -> &FrameState {
        &self.frame
    }

    pub fn fields(&self) -> &FieldShiftRegister {
        &self.fields
    }

    /// Link levels as currently seen by the decoder.
    pub fn synchronized(&self) -> Pins {
        self.sync.output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Phase;

    const HOLD: usize = 4;

    struct Bench {
        dut: SpiPeripheral,
        pins: Pins,
        verdicts: Vec<FrameVerdict>,
        samples: usize,
    }

    impl Bench {
        fn new() -> Self {
            let mut bench = Self {
                dut: SpiPeripheral::new(),
                pins: Pins::IDLE,
                verdicts: Vec::new(),
                samples: 0,
            };
            bench.dut.advance(Inputs::reset(Pins::IDLE));
            bench.hold(HOLD);
            bench
        }

        fn tick(&mut self) -> Outputs {
            let out = self.dut.advance(Inputs::run(self.pins));
            if out.edges.bit_sample {
                self.samples += 1;
            }
            self.verdicts.extend(out.frame_end);
            out
        }

        fn hold(&mut self, ticks: usize) {
            for _ in 0..ticks {
                self.tick();
            }
        }

        fn select(&mut self) {
            self.pins.ncs = false;
            self.hold(HOLD);
        }

        fn deselect(&mut self) {
            self.pins.sclk = false;
            self.pins.ncs = true;
            self.hold(HOLD);
        }

        fn pulse(&mut self, bit: bool) {
            self.pins.sclk = false;
            self.pins.copi = bit;
            self.hold(HOLD);
            self.pins.sclk = true;
            self.hold(HOLD);
        }

        /// Lead-in pulse followed by the 16 frame bits.
        fn frame(&mut self, rw: bool, address: u8, payload: u8) {
            let word = (rw as u16) << 15 | (address as u16) << 8 | payload as u16;
            self.select();
            self.pulse(false);
            for i in (0..16).rev() {
                self.pulse(word >> i & 1 != 0);
            }
            self.deselect();
        }

        fn last_verdict(&self) -> Option<FrameVerdict> {
            self.verdicts.last().copied()
        }
    }

    #[test]
    fn seventeen_pulses_make_a_valid_frame() {
        let mut bench = Bench::new();
        bench.select();
        for _ in 0..17 {
            bench.pulse(false);
        }
        bench.deselect();
        assert_eq!(bench.samples, 17);
        assert_eq!(
            bench.last_verdict(),
            Some(FrameVerdict {
                valid: true,
                bits: 16
            })
        );
        assert!(bench.dut.frame().is_valid());
    }

    #[test]
    fn short_frame_is_dropped() {
        let mut bench = Bench::new();
        bench.select();
        for _ in 0..15 {
            bench.pulse(true);
        }
        bench.deselect();
        assert_eq!(
            bench.last_verdict(),
            Some(FrameVerdict {
                valid: false,
                bits: 15
            })
        );
        assert!(!bench.dut.frame().is_valid());
        assert_eq!(bench.dut.frame().phase(), Phase::Idle);
    }

    #[test]
    fn out_of_range_address_writes_nothing() {
        let mut bench = Bench::new();
        bench.frame(true, 0b000_0101, 0b0000_0111);
        assert!(bench.last_verdict().is_some_and(|v| v.valid));
        assert_eq!(bench.dut.fields().address(), 5);
        assert_eq!(bench.dut.fields().payload(), 7);
        assert_eq!(*bench.dut.registers(), RegisterFile::new());
    }

    #[test]
    fn write_lands_bit_exact() {
        let mut bench = Bench::new();
        bench.frame(false, 0b000_0010, 0b1010_1010);
        assert!(bench.last_verdict().is_some_and(|v| v.valid));
        assert_eq!(bench.dut.registers().get(Register::EnablePwmLow), 0b1010_1010);
        assert_eq!(bench.dut.registers().get(Register::EnableOutLow), 0);
    }

    #[test]
    fn read_flag_does_not_block_write() {
        let mut write = Bench::new();
        write.frame(false, 0b000_0010, 0b1010_1010);
        let mut read = Bench::new();
        read.frame(true, 0b000_0010, 0b1010_1010);
        assert!(read.dut.fields().rw());
        assert_eq!(read.dut.registers(), write.dut.registers());
    }

    #[test]
    fn reset_clears_everything() {
        let mut bench = Bench::new();
        bench.frame(true, 0x04, 0xCF);
        bench.select();
        bench.pulse(true);
        bench.pulse(true);
        assert_eq!(bench.dut.registers().get(Register::DutyCycle), 0xCF);

        let out = bench.dut.advance(Inputs::reset(bench.pins));
        assert_eq!(out.registers, RegisterFile::new());
        assert_eq!(bench.dut.frame().phase(), Phase::Idle);
        assert_eq!(bench.dut.frame().bit_count().get(), 0);
        assert!(!bench.dut.fields().rw());
        assert_eq!(bench.dut.fields().address(), 0);
        assert_eq!(bench.dut.fields().payload(), 0);
        assert_eq!(bench.dut.synchronized(), Pins::LOW);
    }

    #[test]
    fn line_changes_reach_the_decoder_two_ticks_late() {
        let mut dut = SpiPeripheral::new();
        for _ in 0..HOLD {
            dut.advance(Inputs::run(Pins::IDLE));
        }

        let clocked = Pins {
            sclk: true,
            ..Pins::IDLE
        };
        let first = dut.advance(Inputs::run(clocked));
        assert!(!first.edges.bit_sample);
        assert!(!dut.synchronized().sclk);
        let second = dut.advance(Inputs::run(clocked));
        assert!(!second.edges.bit_sample);
        assert!(dut.synchronized().sclk);
        let third = dut.advance(Inputs::run(clocked));
        assert!(third.edges.bit_sample);
    }

    #[test]
    fn aborted_frame_write_stands() {
        let mut bench = Bench::new();
        bench.frame(true, 0x03, 0x5A);
        assert_eq!(bench.dut.registers().get(Register::EnablePwmHigh), 0x5A);

        // Lead-in, rw, address 0x01, then a single payload bit.
        bench.select();
        bench.pulse(false);
        bench.pulse(true);
        for i in (0..7).rev() {
            bench.pulse(0x01 >> i & 1 != 0);
        }
        bench.pulse(true);
        bench.deselect();

        assert_eq!(
            bench.last_verdict(),
            Some(FrameVerdict {
                valid: false,
                bits: 10
            })
        );
        assert_eq!(bench.dut.fields().address(), 0x01);
        assert_eq!(bench.dut.fields().payload(), 0xB5);
        assert_eq!(bench.dut.registers().get(Register::EnableOutHigh), 0xB5);
        assert_eq!(bench.dut.registers().get(Register::EnablePwmHigh), 0x5A);

        bench.hold(HOLD);
        assert_eq!(bench.dut.registers().get(Register::EnableOutHigh), 0xB5);
    }

        #[test]
    fn next_frame_shifts_through_previous_address() {
        let mut bench = Bench::new();
        bench.frame(true, 0x01, 0xCC);
        // 0x01 -> 0x02 on the first address bit; 0x02 picks up the held 0xCC
        bench.frame(true, 0x30, 0xAA);
        assert_eq!(bench.dut.registers().get(Register::EnableOutHigh), 0xCC);
        assert_eq!(bench.dut.registers().get(Register::EnablePwmLow), 0xCC);
        assert_eq!(bench.dut.fields().address(), 0x30);
    }
}
