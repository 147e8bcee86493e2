/// Levels of the three serial link lines for one tick
///
/// The lines are named from the peripheral's point of view: `sclk` is the
/// serial clock, `copi` carries controller-out/peripheral-in data and `ncs`
/// is the active-low chip select. Idle link: clock low, select high.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pins {
    pub sclk: bool,
    pub copi: bool,
    pub ncs: bool,
}

const UI_SCLK: u8 = 1 << 0;
const UI_COPI: u8 = 1 << 1;
const UI_NCS: u8 = 1 << 2;

impl Pins {
    /// Link at rest: chip select deasserted, clock and data low.
    pub const IDLE: Pins = Pins {
        sclk: false,
        copi: false,
        ncs: true,
    };

    /// All lines low, which is also the synchronizer state after reset.
    pub const LOW: Pins = Pins {
        sclk: false,
        copi: false,
        ncs: false,
    };

    /// Unpack the board's `ui_in` bus (bit 0 SCLK, bit 1 COPI, bit 2 nCS).
    /// The remaining bits are not wired to the link and are ignored.
    pub fn from_ui_in(ui_in: u8) -> Self {
        Self {
            sclk: ui_in & UI_SCLK != 0,
            copi: ui_in & UI_COPI != 0,
            ncs: ui_in & UI_NCS != 0,
        }
    }

    pub fn ui_in(&self) -> u8 {
        let mut bus = 0;
        if self.sclk {
            bus |= UI_SCLK;
        }
        if self.copi {
            bus |= UI_COPI;
        }
        if self.ncs {
            bus |= UI_NCS;
        }
        bus
    }
}

impl Default for Pins {
    fn default() -> Self {
        Self::IDLE
    }
}

/// External inputs sampled on one tick of the local clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inputs {
    /// Synchronous reset, active low.
    pub reset_n: bool,
    pub pins: Pins,
}

impl Inputs {
    pub fn run(pins: Pins) -> Self {
        Self {
            reset_n: true,
            pins,
        }
    }

    pub fn reset(pins: Pins) -> Self {
        Self {
            reset_n: false,
            pins,
        }
    }
}
