//! Scenario testbench for the SPI register-bank peripheral
//!
//! Each YAML file under `testbench/scenarios/` is one trial, run on a fresh
//! simulator. Set `SPIREG_TRACE` to keep a VCD of every trial under
//! `target/vcd/`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};

pub use spireg::{Register, RegisterFile, Scenario, ScenarioReport, Simulator};

pub const SCENARIO_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios");
const TARGET_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../target");

/// Where the trace of scenario `name` is written.
pub fn vcd_path(name: &str) -> PathBuf {
    PathBuf::from(format!("{}/vcd/scenario_{}.vcd", TARGET_PATH, name))
}

/// Run one scenario file, tracing to `vcd` when given.
pub fn run_scenario_file(path: &Path, vcd: Option<&Path>) -> Result<ScenarioReport> {
    let path = Utf8Path::from_path(path)
        .ok_or_else(|| anyhow::anyhow!("non UTF-8 path: {}", path.display()))?;
    let scenario = Scenario::from_path(path).context("Failed to load scenario")?;

    let mut sim = Simulator::new(scenario.config.clone()).context("Invalid scenario config")?;
    if let Some(vcd) = vcd {
        let vcd = Utf8PathBuf::from_path_buf(vcd.to_path_buf())
            .map_err(|p| anyhow::anyhow!("non UTF-8 path: {}", p.display()))?;
        if let Some(dir) = vcd.parent() {
            std::fs::create_dir_all(dir)?;
        }
        sim.open_vcd(&vcd).context("Failed to open VCD trace")?;
    }

    let report = scenario
        .run_on(&mut sim)
        .with_context(|| format!("Scenario {} failed", scenario.name()))?;
    sim.close_vcd().context("Failed to flush VCD trace")?;
    Ok(report)
}
