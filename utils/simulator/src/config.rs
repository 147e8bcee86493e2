use serde::Deserialize;

use crate::error::Result;
use crate::host::LinkTiming;

/// Simulation settings, read from the `config` section of a scenario
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Length of one tick in the trace, in nanoseconds.
    #[serde(rename = "clockPeriodNs")]
    pub clock_period_ns: u64,
    #[serde(rename = "sclkHalfPeriodTicks")]
    pub sclk_half_period_ticks: usize,
    #[serde(rename = "csSetupTicks")]
    pub cs_setup_ticks: usize,
    #[serde(rename = "trailingIdleTicks")]
    pub trailing_idle_ticks: usize,
    /// Ticks reset is held for when a step asks for a reset without a count.
    #[serde(rename = "resetTicks")]
    pub reset_ticks: usize,
    #[serde(rename = "leadInPulse")]
    pub lead_in_pulse: bool,
}

impl SimConfig {
    pub fn link_timing(&self) -> LinkTiming {
        LinkTiming {
            half_period: self.sclk_half_period_ticks,
            cs_setup: self.cs_setup_ticks,
            trailing_idle: self.trailing_idle_ticks,
            lead_in: self.lead_in_pulse,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.link_timing().validate()
    }
}

impl Default for SimConfig {
    // 10 MHz core clock, 10 kHz SCLK
    fn default() -> Self {
        let timing = LinkTiming::default();
        Self {
            clock_period_ns: 100,
            sclk_half_period_ticks: timing.half_period,
            cs_setup_ticks: timing.cs_setup,
            trailing_idle_ticks: timing.trailing_idle,
            reset_ticks: 5,
            lead_in_pulse: timing.lead_in,
        }
    }
}
