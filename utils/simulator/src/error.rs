use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::frame::FrameVerdict;
use crate::register_file::Register;

#[derive(Error, Debug)]
pub enum Error {
    #[error("address 0x{0:02x} does not fit in 7 bits")]
    AddressOutOfRange(u8),
    #[error("unknown register: {0}")]
    UnknownRegister(String),
    #[error("invalid link timing: {0}")]
    InvalidTiming(&'static str),
    #[error("failed to read {path}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse scenario")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to write trace")]
    Trace(#[from] io::Error),
    #[error("{register}: expected 0x{expected:02x}, got 0x{actual:02x} (tick {tick})")]
    RegisterMismatch {
        register: Register,
        expected: u8,
        actual: u8,
        tick: u64,
    },
    #[error("expected a {} frame, last frame was {}", validity(.expected), describe(.actual))]
    FrameMismatch {
        expected: bool,
        actual: Option<FrameVerdict>,
    },
}

fn validity(valid: &bool) -> &'static str {
    if *valid { "valid" } else { "invalid" }
}

fn describe(verdict: &Option<FrameVerdict>) -> String {
    match verdict {
        Some(verdict) => format!("{} ({} bits counted)", validity(&verdict.valid), verdict.bits),
        None => "never closed".to_owned(),
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
