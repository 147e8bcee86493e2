//! Value change dump of the peripheral, one timestamp per tick

use std::io::{self, Write};

use crate::peripheral::{Outputs, SpiPeripheral};
use crate::pins::Pins;
use crate::register_file::Register;

struct Var {
    name: &'static str,
    width: u32,
}

const fn var(name: &'static str, width: u32) -> Var {
    Var { name, width }
}

const VARS: [Var; 20] = [
    var("sclk", 1),
    var("copi", 1),
    var("ncs", 1),
    var("sclk_sync", 1),
    var("copi_sync", 1),
    var("ncs_sync", 1),
    var("bit_sample", 1),
    var("frame_start", 1),
    var("active", 1),
    var("bit_count", 5),
    var("rw", 1),
    var("address", 7),
    var("payload", 8),
    var("valid", 1),
    var("enable_out_low", 8),
    var("enable_out_high", 8),
    var("enable_pwm_low", 8),
    var("enable_pwm_high", 8),
    var("duty_cycle", 8),
    var("reset_n", 1),
];

pub const NUM_VARS: usize = VARS.len();

/// Values of every traced signal on one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample([u32; NUM_VARS]);

impl Sample {
    pub fn capture(reset_n: bool, raw: Pins, dut: &SpiPeripheral, out: &Outputs) -> Self {
        let synced = dut.synchronized();
        let frame = dut.frame();
        let fields = dut.fields();
        let regs = &out.registers;
        Self([
            raw.sclk as u32,
            raw.copi as u32,
            raw.ncs as u32,
            synced.sclk as u32,
            synced.copi as u32,
            synced.ncs as u32,
            out.edges.bit_sample as u32,
            out.edges.frame_start as u32,
            frame.is_active() as u32,
            frame.bit_count().get() as u32,
            fields.rw() as u32,
            fields.address() as u32,
            fields.payload() as u32,
            frame.is_valid() as u32,
            regs.get(Register::EnableOutLow) as u32,
            regs.get(Register::EnableOutHigh) as u32,
            regs.get(Register::EnablePwmLow) as u32,
            regs.get(Register::EnablePwmHigh) as u32,
            regs.get(Register::DutyCycle) as u32,
            reset_n as u32,
        ])
    }
}

/// Streaming VCD writer
pub struct VcdWriter<W: Write> {
    out: W,
    period_ns: u64,
    last: Option<Sample>,
}

fn ident(idx: usize) -> char {
    char::from(b'!' + idx as u8)
}

impl<W: Write> VcdWriter<W> {
    /// Write the header; `period_ns` scales tick numbers to timestamps.
    pub fn new(mut out: W, period_ns: u64) -> io::Result<Self> {
        writeln!(out, "$version spireg {} $end", env!("CARGO_PKG_VERSION"))?;
        writeln!(out, "$timescale 1ns $end")?;
        writeln!(out, "$scope module spi_peripheral $end")?;
        for (idx, var) in VARS.iter().enumerate() {
            let kind = if var.width == 1 { "wire" } else { "reg" };
            writeln!(
                out,
                "$var {} {} {} {} $end",
                kind,
                var.width,
                ident(idx),
                var.name
            )?;
        }
        writeln!(out, "$upscope $end")?;
        writeln!(out, "$enddefinitions $end")?;
        Ok(Self {
            out,
            period_ns,
            last: None,
        })
    }

    /// Emit the signals that changed since the previous dump.
    pub fn dump(&mut self, tick: u64, sample: &Sample) -> io::Result<()> {
        let changed: Vec<usize> = match &self.last {
            Some(last) => (0..NUM_VARS)
                .filter(|&idx| last.0[idx] != sample.0[idx])
                .collect(),
            None => (0..NUM_VARS).collect(),
        };
        if changed.is_empty() {
            return Ok(());
        }

        writeln!(self.out, "#{}", tick * self.period_ns)?;
        for idx in changed {
            let value = sample.0[idx];
            if VARS[idx].width == 1 {
                writeln!(self.out, "{}{}", value, ident(idx))?;
            } else {
                writeln!(self.out, "b{:b} {}", value, ident(idx))?;
            }
        }
        self.last = Some(*sample);
        Ok(())
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}
