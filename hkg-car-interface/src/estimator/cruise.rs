//! Cruise set-speed tracking
//!
//! Above 20 cluster-speed units the cruise unit (or the lever fallback)
//! reports enablement and set speed directly. At or below that speed the
//! car stops reporting a set speed, so a software-held virtual set speed is
//! latched instead while the driver keeps cruise armed.

use crate::types::CruiseState;

/// Cluster speed at and below which the held set speed takes over
pub const LOW_SPEED_THRESHOLD: f64 = 20.0;
/// Smallest held set speed, in cluster units
pub const MIN_HELD_SPEED: f64 = 5.0;
/// Cruise switch code for cancel
pub const SWITCH_CANCEL: f64 = 3.0;

pub const KPH_TO_MS: f64 = 1.0 / 3.6;
pub const MPH_TO_MS: f64 = 0.447_04;

/// Raw cruise inputs for one cycle, already routed from the right bus
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CruiseInputs {
    /// Cruise unit (or lever) reports cruise engaged
    pub enabled: bool,
    pub available: bool,
    pub standstill: bool,
    /// Set speed reported by the cruise unit or lever, cluster units
    pub set_speed: f64,
    /// Cluster displayed speed
    pub cluster_speed: f64,
    /// Cluster cruise switch state
    pub switch_state: f64,
    pub speed_in_mph: bool,
}

/// Which branch of the state machine produced the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CruiseRegime {
    PassThrough,
    Held,
    Off,
}

/// Sticky low-speed cruise latch
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CruiseTracker {
    sticky: bool,
    held_speed: f64,
    regime: Option<CruiseRegime>,
}

/// Whether a cruise switch state re-arms the held set speed
///
/// Every switch state currently re-arms, so `SWITCH_CANCEL` never reaches
/// the disable arm below. This is how the car behaves today; the intended
/// set of re-arming codes is unconfirmed and must not be guessed.
pub fn switch_rearms_hold(_switch_state: f64) -> bool {
    true
}

impl CruiseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch is currently holding a virtual set speed
    pub fn is_sticky(&self) -> bool {
        self.sticky
    }

    /// Held set speed in cluster units
    pub fn held_speed(&self) -> f64 {
        self.held_speed
    }

    /// Advance one cycle
    pub fn update(&mut self, input: &CruiseInputs) -> CruiseState {
        let unit = if input.speed_in_mph { MPH_TO_MS } else { KPH_TO_MS };
        let mut state = CruiseState {
            enabled: false,
            available: input.available,
            standstill: input.standstill,
            speed: 0.0,
        };

        let regime = if input.enabled && input.cluster_speed >= LOW_SPEED_THRESHOLD {
            state.speed = input.set_speed * unit;
            state.enabled = true;
            self.sticky = false;
            CruiseRegime::PassThrough
        } else if input.cluster_speed <= LOW_SPEED_THRESHOLD
            && input.available
            && (input.switch_state != 0.0 || self.sticky)
        {
            if switch_rearms_hold(input.switch_state) {
                self.held_speed = input.cluster_speed;
                state.enabled = true;
            } else if input.switch_state == SWITCH_CANCEL {
                state.enabled = false;
            }
            self.held_speed = self.held_speed.max(MIN_HELD_SPEED);
            state.speed = self.held_speed * unit;
            self.sticky = true;
            CruiseRegime::Held
        } else {
            self.sticky = false;
            CruiseRegime::Off
        };

        if self.regime != Some(regime) {
            log::debug!("Cruise regime {:?} -> {:?}", self.regime, regime);
            self.regime = Some(regime);
        }

        state.speed = state.speed.max(0.0);
        state
    }
}
