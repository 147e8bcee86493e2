mod config;
mod core;
mod edge;
mod error;
mod frame;
mod host;
mod peripheral;
mod pins;
mod register_file;
mod scenario;
mod shift;
mod sync;
mod trace;

// Re-export public API
pub use config::SimConfig;
pub use crate::core::Simulator;
pub use edge::Edges;
pub use error::{Error, Result};
pub use frame::{BitCount, FRAME_BITS, FrameState, FrameVerdict, Phase};
pub use host::{LinkTiming, Transaction, Waveform};
pub use peripheral::{Outputs, SpiPeripheral};
pub use pins::{Inputs, Pins};
pub use register_file::{NUM_REGISTERS, Register, RegisterFile};
pub use scenario::{FrameExpectation, FrameSpec, Scenario, ScenarioReport, Step, TruncatedSpec};
pub use shift::{Field, FieldShiftRegister};
pub use sync::{SYNC_STAGES, Synchronizer};
pub use trace::{NUM_VARS, Sample, VcdWriter};
