//! Scripted link sessions
//!
//! A scenario is a YAML document with an optional `config` section and an
//! ordered list of `steps`:
//!
//! ```yaml
//! name: pwm setup
//! config:
//!   sclkHalfPeriodTicks: 50
//! steps:
//!   - reset: 5
//!   - write: { address: 0x02, data: 0x01 }
//!   - expectFrame: valid
//!   - expect: { enablePwmLow: 0x01 }
//!   - truncated: { address: 0x04, data: 0x80, pulses: 8 }
//!   - expectFrame: invalid
//!   - idle: 100
//! ```

use std::collections::BTreeMap;

use camino::Utf8Path;
use log::info;
use serde::Deserialize;

use crate::config::SimConfig;
use crate::core::Simulator;
use crate::error::{Error, Result};
use crate::frame::FrameVerdict;
use crate::host::Transaction;
use crate::register_file::{Register, RegisterFile};

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub config: SimConfig,
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub steps: Vec<Step>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Step {
    /// Hold reset; without a count the configured reset length is used.
    Reset(Option<usize>),
    Idle(usize),
    Write(FrameSpec),
    Read(FrameSpec),
    Truncated(TruncatedSpec),
    /// Register name to expected value.
    Expect(BTreeMap<String, u8>),
    ExpectFrame(FrameExpectation),
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FrameSpec {
    pub address: u8,
    pub data: u8,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TruncatedSpec {
    #[serde(default = "write_flag")]
    pub rw: bool,
    pub address: u8,
    pub data: u8,
    /// Clock edges sent before nCS is released.
    pub pulses: usize,
}

fn write_flag() -> bool {
    true
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FrameExpectation {
    Valid,
    Invalid,
}

/// Summary of a finished scenario
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub name: String,
    pub steps: usize,
    pub valid_frames: usize,
    pub dropped_frames: usize,
    pub cycles: u64,
    pub registers: RegisterFile,
}

impl Scenario {
    pub fn from_path(path: &Utf8Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_owned(),
            source,
        })?;
        let mut scenario = Self::parse(&text)?;
        if scenario.name.is_none() {
            scenario.name = path.file_stem().map(str::to_owned);
        }
        Ok(scenario)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let scenario: Scenario = serde_yaml::from_str(text)?;
        scenario.config.validate()?;
        Ok(scenario)
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }

    /// Run on a fresh simulator built from the scenario's own config.
    pub fn run(&self) -> Result<ScenarioReport> {
        let mut sim = Simulator::new(self.config.clone())?;
        self.run_on(&mut sim)
    }

    /// Run on an existing simulator, stopping at the first failed expectation.
    pub fn run_on(&self, sim: &mut Simulator) -> Result<ScenarioReport> {
        info!("Running scenario {} ({} steps)", self.name(), self.steps.len());
        let mut valid_frames = 0;
        let mut dropped_frames = 0;
        let mut count = |verdict: Option<FrameVerdict>| match verdict {
            Some(v) if v.valid => valid_frames += 1,
            Some(_) => dropped_frames += 1,
            None => {}
        };

        for step in &self.steps {
            match step {
                Step::Reset(cycles) => {
                    sim.reset(cycles.unwrap_or(sim.config().reset_ticks))?;
                }
                Step::Idle(cycles) => sim.idle(*cycles)?,
                Step::Write(frame) => {
                    let tx = Transaction::write(frame.address, frame.data)?;
                    count(sim.transfer(&tx)?);
                }
                Step::Read(frame) => {
                    let tx = Transaction::read(frame.address, frame.data)?;
                    count(sim.transfer(&tx)?);
                }
                Step::Truncated(spec) => {
                    let tx = Transaction::new(spec.rw, spec.address, spec.data)?;
                    count(sim.transfer_truncated(&tx, spec.pulses)?);
                }
                Step::Expect(expected) => check_registers(sim, expected)?,
                Step::ExpectFrame(expectation) => {
                    let expected = *expectation == FrameExpectation::Valid;
                    let actual = sim.last_frame();
                    if actual.map(|v| v.valid) != Some(expected) {
                        return Err(Error::FrameMismatch { expected, actual });
                    }
                }
            }
        }

        Ok(ScenarioReport {
            name: self.name().to_owned(),
            steps: self.steps.len(),
            valid_frames,
            dropped_frames,
            cycles: sim.cycles(),
            registers: *sim.registers(),
        })
    }
}

fn check_registers(sim: &Simulator, expected: &BTreeMap<String, u8>) -> Result<()> {
    for (name, &value) in expected {
        let register: Register = name.parse()?;
        let actual = sim.registers().get(register);
        if actual != value {
            return Err(Error::RegisterMismatch {
                register,
                expected: value,
                actual,
                tick: sim.cycles(),
            });
        }
    }
    Ok(())
}
