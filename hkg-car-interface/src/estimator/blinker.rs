//! Turn signal debouncing
//!
//! The lever switch and the bulb signal both chatter. The switch is held
//! "on" for 50 cycles after its last assertion. Above 17.5 m/s the bulb is
//! stretched so the indicator reads as one continuous flash: 300 cycles
//! for a lane change blink, 50 while the lever is held.

/// Cycles the lever stays "on" after its last assertion
pub const SWITCH_HOLD_CYCLES: u32 = 50;
/// Flash hold while cruising with the lever released
pub const FLASH_HOLD_CYCLES: u32 = 300;
/// Flash hold while the lever is held
pub const FLASH_HOLD_TURNING_CYCLES: u32 = 50;
/// Filtered speed (m/s) above which the flash is stretched
pub const FLASH_STRETCH_SPEED: f64 = 17.5;

/// Reset-to-ceiling / decay-to-zero integrator
///
/// `hold` re-arms the counter, otherwise it counts down one per cycle.
pub fn debounce(counter: u32, asserted: bool, hold: u32) -> u32 {
    if asserted {
        hold
    } else {
        counter.saturating_sub(1)
    }
}

/// Debounce state for one side of the car
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blinker {
    on_count: u32,
    flash_count: u32,
}

/// Output of one blinker update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlinkerOutput {
    pub on: bool,
    pub flash: bool,
}

impl Blinker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one cycle
    ///
    /// * `v_ego` - filtered speed in m/s
    /// * `switch` - lever switch signal
    /// * `bulb` - raw bulb signal
    pub fn update(&mut self, v_ego: f64, switch: bool, bulb: bool) -> BlinkerOutput {
        self.on_count = debounce(self.on_count, switch, SWITCH_HOLD_CYCLES);
        let on = self.on_count > 0;

        let flash = if v_ego > FLASH_STRETCH_SPEED {
            let hold = if on {
                FLASH_HOLD_TURNING_CYCLES
            } else {
                FLASH_HOLD_CYCLES
            };
            self.flash_count = debounce(self.flash_count, bulb, hold);
            self.flash_count > 0
        } else {
            // low speed: the counter is left untouched
            bulb
        };

        BlinkerOutput { on, flash }
    }

    /// Remaining lever hold cycles
    pub fn on_count(&self) -> u32 {
        self.on_count
    }

    /// Remaining flash hold cycles
    pub fn flash_count(&self) -> u32 {
        self.flash_count
    }
}
