use crate::pins::Pins;

/// Single-tick pulses derived from the synchronized link lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Edges {
    /// SCLK went low to high: sample one data bit.
    pub bit_sample: bool,
    /// nCS went high to low: a new frame begins.
    pub frame_start: bool,
}

/// Remembers the previous synchronized levels so that edges can be found
#[derive(Debug, Clone)]
pub struct EdgeDetector {
    prev: Pins,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self { prev: Pins::LOW }
    }

    /// Combinational edge check of `current` against last tick's levels.
    pub fn detect(&self, current: Pins) -> Edges {
        Edges {
            bit_sample: current.sclk && !self.prev.sclk,
            frame_start: !current.ncs && self.prev.ncs,
        }
    }

    pub fn update(&mut self, current: Pins) {
        self.prev = current;
    }

    pub fn clear(&mut self) {
        self.prev = Pins::LOW;
    }
}

impl Default for EdgeDetector {
    fn default() -> Self {
        Self::new()
    }
}
