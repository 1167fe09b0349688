//! Stop-and-go resume button emulation
//!
//! While the car is held at standstill the cruise unit will not pull away
//! by itself. When the lead vehicle moves (its distance changes from the
//! value captured on stopping) the controller taps the resume button: up to
//! six presses in a burst, then a pause of more than five cycles before the
//! next burst, which matches the cadence of a physical button.

/// Presses per burst before the pause kicks in
pub const PULSES_PER_BURST: u32 = 6;
/// Cycles that must pass after a burst before pressing again
pub const BURST_PAUSE_CYCLES: u64 = 5;

/// Resume pulse generator state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResumeGenerator {
    /// Lead distance captured on entering standstill, `None` when moving
    baseline: Option<f64>,
    pulses: u32,
    last_burst_frame: Option<u64>,
}

impl ResumeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one cycle; returns true when a resume press should be sent
    pub fn update(&mut self, standstill: bool, lead_distance: f64, frame: u64) -> bool {
        if !standstill {
            self.baseline = None;
            return false;
        }

        let Some(baseline) = self.baseline else {
            self.baseline = Some(lead_distance);
            self.pulses = 0;
            return false;
        };

        if lead_distance == baseline || !self.burst_gate_open(frame) {
            return false;
        }

        self.pulses += 1;
        if self.pulses >= PULSES_PER_BURST {
            log::debug!("Resume burst complete at frame {}", frame);
            self.last_burst_frame = Some(frame);
            self.pulses = 0;
        }
        true
    }

    fn burst_gate_open(&self, frame: u64) -> bool {
        match self.last_burst_frame {
            None => true,
            Some(last) => frame.saturating_sub(last) > BURST_PAUSE_CYCLES,
        }
    }

    /// Lead distance captured on stopping
    pub fn baseline(&self) -> Option<f64> {
        self.baseline
    }

    /// Presses sent in the current burst
    pub fn pulses(&self) -> u32 {
        self.pulses
    }
}
