use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use log::{LevelFilter, info};
use spireg::{Register, Scenario, Simulator};

#[derive(Parser)]
#[command(name = "spireg-sim")]
#[command(about = "Cycle-accurate SPI register-bank peripheral simulator")]
#[command(version)]
struct Args {
    /// Scenario file (YAML) to run
    #[arg(value_name = "SCENARIO")]
    scenario: Option<Utf8PathBuf>,

    /// VCD output file
    #[arg(long)]
    vcd: Option<Utf8PathBuf>,

    /// Override the SCLK half period from the scenario config, in ticks
    #[arg(long)]
    half_period: Option<usize>,

    /// List register addresses and exit
    #[arg(long)]
    list_registers: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Log level selected by the `-v` count; `RUST_LOG` still overrides it.
fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(log_level(args.verbose))
        .parse_default_env()
        .init();

    if args.list_registers {
        println!("Registers:");
        for reg in Register::ALL {
            println!("  0x{:02x}  {}", reg.address(), reg);
        }
        return Ok(());
    }

    let path = args
        .scenario
        .ok_or_else(|| anyhow::anyhow!("SCENARIO argument is required"))?;
    let mut scenario = Scenario::from_path(&path)
        .with_context(|| format!("Failed to load scenario {}", path))?;
    if let Some(half_period) = args.half_period {
        scenario.config.sclk_half_period_ticks = half_period;
    }

    let mut sim = Simulator::new(scenario.config.clone()).context("Invalid simulation config")?;
    if let Some(vcd) = &args.vcd {
        sim.open_vcd(vcd)
            .with_context(|| format!("Failed to create {}", vcd))?;
    }

    let report = scenario
        .run_on(&mut sim)
        .with_context(|| format!("Scenario {} failed", scenario.name()))?;
    sim.close_vcd().context("Failed to flush VCD trace")?;

    info!(
        "{}: {} steps, {} frames accepted, {} dropped, {} cycles",
        report.name, report.steps, report.valid_frames, report.dropped_frames, report.cycles
    );
    println!("Registers:");
    print!("{}", report.registers);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_selects_level() {
        assert_eq!(log_level(0), LevelFilter::Info);
        assert_eq!(log_level(1), LevelFilter::Debug);
        assert_eq!(log_level(2), LevelFilter::Trace);
        assert_eq!(log_level(7), LevelFilter::Trace);
    }

    #[test]
    fn repeated_verbose_flag_is_counted() {
        let args = Args::try_parse_from(["spireg-sim", "-vv", "session.yaml"]).unwrap();
        assert_eq!(args.verbose, 2);
        assert_eq!(log_level(args.verbose), LevelFilter::Trace);
        assert_eq!(args.scenario.as_deref(), Some(camino::Utf8Path::new("session.yaml")));
    }
}
