//! Longitudinal command shaping

use crate::config::AccelLimits;

/// Hold the command steady for small oscillations
///
/// While `accel` stays within `gap` of `steady`, `steady` is returned
/// unchanged. Otherwise the steady value moves to the edge of the band
/// nearest to `accel`.
pub fn accel_hysteresis(accel: f64, steady: f64, gap: f64) -> f64 {
    if accel > steady + gap {
        accel - gap
    } else if accel < steady - gap {
        accel + gap
    } else {
        steady
    }
}

/// Stateful accel shaping: hysteresis, scaling, clamping
#[derive(Debug, Clone, Copy)]
pub struct AccelShaper {
    limits: AccelLimits,
    steady: f64,
}

impl AccelShaper {
    pub fn new(limits: AccelLimits) -> Self {
        Self { limits, steady: 0.0 }
    }

    /// Current steady value (unitless fraction)
    pub fn steady(&self) -> f64 {
        self.steady
    }

    /// Turn a gas/brake request into an accel command in m/s^2
    pub fn apply(&mut self, gas: f64, brake: f64) -> f64 {
        self.steady = accel_hysteresis(gas - brake, self.steady, self.limits.hysteresis_gap);
        (self.steady * self.limits.scale()).clamp(self.limits.min, self.limits.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAP: f64 = 0.02;

    #[test]
    fn test_hysteresis_inside_band_keeps_steady() {
        for accel in [0.3, 0.31, 0.29, 0.315, 0.285] {
            assert_eq!(accel_hysteresis(accel, 0.3, GAP), 0.3);
        }
    }

    #[test]
    fn test_hysteresis_slews_to_band_edge() {
        let up = accel_hysteresis(0.5, 0.3, GAP);
        assert!((up - 0.48).abs() < 1e-12);

        let down = accel_hysteresis(-0.2, 0.3, GAP);
        assert!((down - (-0.18)).abs() < 1e-12);
    }

    #[test]
    fn test_hysteresis_property_sweep() {
        let steady = 0.1;
        let mut accel = -1.0;
        while accel <= 1.0 {
            let result = accel_hysteresis(accel, steady, GAP);
            if (accel - steady).abs() <= GAP {
                assert!((result - steady).abs() <= GAP);
            } else if accel > steady {
                assert!((result - (accel - GAP)).abs() < 1e-12);
            } else {
                assert!((result - (accel + GAP)).abs() < 1e-12);
            }
            accel += 0.013;
        }
    }

    #[test]
    fn test_shaper_clamps_to_limits() {
        let limits = AccelLimits::default();
        let mut shaper = AccelShaper::new(limits);

        let full_gas = shaper.apply(1.0, 0.0);
        assert_eq!(full_gas, limits.max);

        let full_brake = shaper.apply(0.0, 1.0);
        assert!((full_brake - (-0.98 * limits.scale())).abs() < 1e-12);

        let past_limit = AccelShaper::new(limits).apply(0.0, 1.5);
        assert_eq!(past_limit, limits.min);

        let mild = shaper.apply(0.1, 0.0);
        assert!((mild - (0.1 - GAP) * limits.scale()).abs() < 1e-12);
        assert!(mild >= limits.min && mild <= limits.max);
    }
}
