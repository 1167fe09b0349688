//! Speed smoothing filter seam
//!
//! The estimator only needs "raw speed in, filtered speed and acceleration
//! out". `Kf1dSpeedFilter` is the steady-state constant-acceleration Kalman
//! filter used on the car; any other implementation can be plugged in.

/// Smooths raw wheel-speed velocity into velocity and acceleration
pub trait SpeedFilter {
    /// Feed one raw velocity sample, get `(velocity, acceleration)` back
    fn update(&mut self, v_raw: f64) -> (f64, f64);
}

/// Control cycle period in seconds
pub const DT_CTRL: f64 = 0.01;

/// Filter is re-seeded when the raw speed jumps further than this from the
/// filtered estimate
const RESET_THRESHOLD: f64 = 2.0;

/// Steady-state Kalman gain, solved for a `DT_CTRL` period
const GAIN: [f64; 2] = [0.122_876_73, 0.296_663_09];

/// Steady-state 1-D Kalman filter over `[velocity, acceleration]`
///
/// Runs at the 100 Hz control rate only; the gain is tied to `DT_CTRL`.
#[derive(Debug, Clone)]
pub struct Kf1dSpeedFilter {
    x: [f64; 2],
}

impl Kf1dSpeedFilter {
    pub fn new() -> Self {
        Self { x: [0.0, 0.0] }
    }

    /// Current `(velocity, acceleration)` estimate
    pub fn estimate(&self) -> (f64, f64) {
        (self.x[0], self.x[1])
    }
}

impl Default for Kf1dSpeedFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeedFilter for Kf1dSpeedFilter {
    fn update(&mut self, v_raw: f64) -> (f64, f64) {
        if (v_raw - self.x[0]).abs() > RESET_THRESHOLD {
            self.x = [v_raw, 0.0];
        }

        // predict
        let v_pred = self.x[0] + DT_CTRL * self.x[1];
        let a_pred = self.x[1];

        // correct
        let innovation = v_raw - v_pred;
        self.x = [
            v_pred + GAIN[0] * innovation,
            a_pred + GAIN[1] * innovation,
        ];

        self.estimate()
    }
}
