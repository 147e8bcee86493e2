use crate::edge::Edges;

/// Number of counted clock pulses that makes a frame complete.
pub const FRAME_BITS: u8 = 16;

/// Saturating pulse counter for the current frame (0..=16)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct BitCount(u8);

impl BitCount {
    pub const ZERO: BitCount = BitCount(0);
    pub const FULL: BitCount = BitCount(FRAME_BITS);

    pub fn new(count: u8) -> Self {
        Self(count.min(FRAME_BITS))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_full(self) -> bool {
        self == Self::FULL
    }

    #[must_use]
    pub fn incremented(self) -> Self {
        Self::new(self.0.saturating_add(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Framing,
}

/// Result of closing a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameVerdict {
    pub valid: bool,
    /// Counter value when the frame was closed.
    pub bits: u8,
}

/// What the state machine decided on one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStep {
    /// Counter value before this tick's increment, present when a data bit
    /// is sampled inside an active frame.
    pub sampled: Option<BitCount>,
    pub verdict: Option<FrameVerdict>,
}

/// Frame lifecycle: start on nCS falling, count SCLK rising edges, judge on nCS high
#[derive(Debug, Clone, Default)]
pub struct FrameState {
    active: bool,
    count: BitCount,
    valid: bool,
}

impl FrameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        if self.active {
            Phase::Framing
        } else {
            Phase::Idle
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn bit_count(&self) -> BitCount {
        self.count
    }

    /// Whether the last closed frame reached a full count.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Advance one tick. `select_idle` is the synchronized nCS level.
    ///
    /// A frame start wins over the end check on the same tick, and the end
    /// check wins over a bit sample.
    pub fn step(&mut self, edges: Edges, select_idle: bool) -> FrameStep {
        if edges.frame_start {
            self.active = true;
            self.count = BitCount::ZERO;
            self.valid = false;
            return FrameStep::default();
        }

        if !self.active {
            return FrameStep::default();
        }

        if select_idle {
            self.active = false;
            self.valid = self.count.is_full();
            return FrameStep {
                sampled: None,
                verdict: Some(FrameVerdict {
                    valid: self.valid,
                    bits: self.count.get(),
                }),
            };
        }

        if edges.bit_sample {
            let before = self.count;
            self.count = before.incremented();
            return FrameStep {
                sampled: Some(before),
                verdict: None,
            };
        }

        FrameStep::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
