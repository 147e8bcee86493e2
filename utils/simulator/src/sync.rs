use crate::pins::Pins;

/// Number of flip-flop stages between the raw link lines and the decoder.
pub const SYNC_STAGES: usize = 2;

/// Two-flop synchronizer for the asynchronous link lines
///
/// Each tick the raw levels enter stage 0 and every stage moves one step
/// towards the output. Only the last stage may be read by the rest of the
/// decoder, so every line change is seen exactly [`SYNC_STAGES`] ticks late.
#[derive(Debug, Clone)]
pub struct Synchronizer {
    stages: [Pins; SYNC_STAGES],
}

impl Synchronizer {
    pub fn new() -> Self {
        Self {
            stages: [Pins::LOW; SYNC_STAGES],
        }
    }

    /// Synchronized levels as of the end of the previous tick.
    pub fn output(&self) -> Pins {
        self.stages[SYNC_STAGES - 1]
    }

    pub fn shift(&mut self, raw: Pins) {
        self.stages.rotate_right(1);
        self.stages[0] = raw;
    }

    pub fn clear(&mut self) {
        self.stages = [Pins::LOW; SYNC_STAGES];
    }
}

impl Default for Synchronizer {
    fn default() -> Self {
        Self::new()
    }
}
