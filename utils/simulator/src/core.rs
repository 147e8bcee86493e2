use std::fs::File;
use std::io::BufWriter;

use camino::Utf8Path;
use log::{debug, info, warn};

use crate::config::SimConfig;
use crate::error::Result;
use crate::frame::FrameVerdict;
use crate::host::{Transaction, Waveform};
use crate::peripheral::{Outputs, SpiPeripheral};
use crate::pins::{Inputs, Pins};
use crate::register_file::RegisterFile;
use crate::sync::SYNC_STAGES;
use crate::trace::{Sample, VcdWriter};

/// Drives one peripheral instance tick by tick from the controller side
pub struct Simulator {
    peripheral: SpiPeripheral,
    config: SimConfig,
    tick: u64,
    vcd: Option<VcdWriter<BufWriter<File>>>,
    last_frame: Option<FrameVerdict>,
}

impl Simulator {
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        Ok(Simulator {
            peripheral: SpiPeripheral::new(),
            config,
            tick: 0,
            vcd: None,
            last_frame: None,
        })
    }

    /// Start tracing every following tick into a VCD file.
    pub fn open_vcd(&mut self, path: &Utf8Path) -> Result<()> {
        let file = File::create(path)?;
        self.vcd = Some(VcdWriter::new(
            BufWriter::new(file),
            self.config.clock_period_ns,
        )?);
        info!("Tracing to {}", path);
        Ok(())
    }

    pub fn close_vcd(&mut self) -> Result<()> {
        if let Some(vcd) = self.vcd.take() {
            vcd.finish()?;
        }
        Ok(())
    }

    /// Hold reset for `cycles` ticks with the link idle, then release it and
    /// keep the link idle until the synchronizer has caught up.
    ///
    /// Reset leaves the synchronized nCS low; without the settle ticks a
    /// frame sent straight after reset would never see nCS fall.
    pub fn reset(&mut self, cycles: usize) -> Result<()> {
        debug!("reset for {} cycles", cycles);
        for _ in 0..cycles {
            self.tick(Inputs::reset(Pins::IDLE))?;
        }
        for _ in 0..SYNC_STAGES {
            self.tick(Inputs::run(Pins::IDLE))?;
        }
        self.last_frame = None;
        Ok(())
    }

    pub fn idle(&mut self, cycles: usize) -> Result<()> {
        self.drive(std::iter::repeat_n(Pins::IDLE, cycles))?;
        Ok(())
    }

    /// Send one complete transaction, returning the verdict of the frame
    /// closed while it was on the wire.
    pub fn transfer(&mut self, tx: &Transaction) -> Result<Option<FrameVerdict>> {
        let wave = Waveform::transaction(tx, &self.config.link_timing());
        self.drive(wave)
    }

    /// Send a transaction that is abandoned after `pulses` clock edges.
    pub fn transfer_truncated(
        &mut self,
        tx: &Transaction,
        pulses: usize,
    ) -> Result<Option<FrameVerdict>> {
        let wave = Waveform::truncated(tx, &self.config.link_timing(), pulses);
        self.drive(wave)
    }

    /// Apply arbitrary per-tick pin levels with reset released.
    pub fn drive<I>(&mut self, levels: I) -> Result<Option<FrameVerdict>>
    where
        I: IntoIterator<Item = Pins>,
    {
        let mut verdict = None;
        for pins in levels {
            let out = self.tick(Inputs::run(pins))?;
            if out.frame_end.is_some() {
                verdict = out.frame_end;
                self.last_frame = out.frame_end;
            }
        }
        Ok(verdict)
    }

    fn tick(&mut self, inputs: Inputs) -> Result<Outputs> {
        let out = self.peripheral.advance(inputs);
        if let Some(vcd) = self.vcd.as_mut() {
            let sample = Sample::capture(inputs.reset_n, inputs.pins, &self.peripheral, &out);
            vcd.dump(self.tick, &sample)?;
        }
        self.tick += 1;
        Ok(out)
    }

    pub fn registers(&self) -> &RegisterFile {
        self.peripheral.registers()
    }

    /// Verdict of the most recently closed frame since the last reset.
    pub fn last_frame(&self) -> Option<FrameVerdict> {
        self.last_frame
    }

    pub fn cycles(&self) -> u64 {
        self.tick
    }

    pub fn peripheral(&self) -> &SpiPeripheral {
        &self.peripheral
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}

impl Drop for Simulator {
    fn drop(&mut self) {
        if let Err(err) = self.close_vcd() {
            warn!("VCD trace not flushed: {}", err);
        }
    }
}
