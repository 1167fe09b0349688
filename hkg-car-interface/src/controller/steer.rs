//! Steering torque limiting
//!
//! Bounds the commanded torque by the absolute maximum, narrows the window
//! when the driver is pushing against the wheel, and limits how fast the
//! magnitude may grow or shrink from one cycle to the next.

use crate::config::SteerLimits;

/// Apply the standard torque limits to a requested torque
///
/// * `requested` - new torque request in torque units
/// * `last` - torque applied on the previous cycle
/// * `driver_torque` - measured driver column torque
///
/// Returns the applied torque as an integer torque unit. The request is
/// rounded first and every bound is rounded toward zero, so the result
/// stays inside both windows even when a limit is not a whole number.
/// `last` is expected to be a previous output of this function.
pub fn apply_std_steer_torque_limits(
    requested: f64,
    last: f64,
    driver_torque: f64,
    limits: &SteerLimits,
) -> f64 {
    // driver override window
    let driver_max = limits.max
        + (limits.driver_allowance + driver_torque * limits.driver_factor)
            * limits.driver_multiplier;
    let driver_min = -limits.max
        + (-limits.driver_allowance + driver_torque * limits.driver_factor)
            * limits.driver_multiplier;
    let max_allowed = limits.max.min(driver_max).max(0.0);
    let min_allowed = (-limits.max).max(driver_min).min(0.0);
    let torque = clamp_inward(requested.round(), min_allowed, max_allowed);

    // rate limits: growing magnitude is slower than shrinking
    if last > 0.0 {
        clamp_inward(
            torque,
            (last - limits.delta_down).max(-limits.delta_up),
            last + limits.delta_up,
        )
    } else {
        clamp_inward(
            torque,
            last - limits.delta_up,
            (last + limits.delta_down).min(limits.delta_up),
        )
    }
}

/// Clamp to the whole numbers inside `[lo, hi]`
fn clamp_inward(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo.ceil()).min(hi.floor())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> SteerLimits {
        SteerLimits::default()
    }

    #[test]
    fn test_ramp_up_limited_by_delta_up() {
        let l = limits();
        assert_eq!(apply_std_steer_torque_limits(255.0, 0.0, 0.0, &l), 3.0);
        assert_eq!(apply_std_steer_torque_limits(255.0, 3.0, 0.0, &l), 6.0);
        assert_eq!(apply_std_steer_torque_limits(-255.0, 0.0, 0.0, &l), -3.0);
        assert_eq!(apply_std_steer_torque_limits(-255.0, -3.0, 0.0, &l), -6.0);
    }

    #[test]
    fn test_ramp_down_limited_by_delta_down() {
        let l = limits();
        assert_eq!(apply_std_steer_torque_limits(0.0, 100.0, 0.0, &l), 93.0);
        assert_eq!(apply_std_steer_torque_limits(0.0, -100.0, 0.0, &l), -93.0);
        // small magnitudes may cross zero by at most delta_up
        assert_eq!(apply_std_steer_torque_limits(-255.0, 2.0, 0.0, &l), -3.0);
    }

    #[test]
    fn test_driver_override_shrinks_window() {
        let l = limits();
        // driver pushing hard the other way closes the positive window
        let applied = apply_std_steer_torque_limits(255.0, 250.0, -300.0, &l);
        assert!(applied <= 0.0_f64.max(250.0 - l.delta_down));
        assert_eq!(applied, 243.0);

        let driver_max = l.max + (l.driver_allowance - 300.0) * l.driver_multiplier;
        assert!(driver_max < 0.0);
    }

    #[test]
    fn test_never_exceeds_max_and_max_delta() {
        let l = limits();
        let requests = [255.0, 300.0, -400.0, 0.0, 128.4, -17.0, 255.0, 255.0];
        let mut last = 0.0;
        for _ in 0..200 {
            for &request in &requests {
                let applied = apply_std_steer_torque_limits(request, last, 0.0, &l);
                assert!(applied.abs() <= l.max);
                assert!((applied - last).abs() <= l.max_delta());
                last = applied;
            }
        }
    }

    #[test]
    fn test_output_is_integral() {
        let l = limits();
        let applied = apply_std_steer_torque_limits(1.4, 0.0, 0.0, &l);
        assert_eq!(applied, 1.0);
        assert_eq!(applied.fract(), 0.0);
    }

    #[test]
    fn test_fractional_limits_are_not_exceeded() {
        let l = SteerLimits {
            max: 100.5,
            delta_up: 2.5,
            delta_down: 2.5,
            ..SteerLimits::default()
        };

        assert_eq!(apply_std_steer_torque_limits(255.0, 0.0, 0.0, &l), 2.0);
        assert_eq!(apply_std_steer_torque_limits(255.0, 100.0, 0.0, &l), 100.0);
        assert_eq!(apply_std_steer_torque_limits(-255.0, -100.0, 0.0, &l), -100.0);

        let mut last = 0.0;
        for request in [255.0, 255.0, -255.0, 0.0, 99.6, 100.4, -100.4] {
            for _ in 0..60 {
                let applied = apply_std_steer_torque_limits(request, last, 0.0, &l);
                assert!(applied.abs() <= l.max, "{} exceeds max", applied);
                assert!((applied - last).abs() <= l.max_delta(), "{} -> {}", last, applied);
                assert_eq!(applied.fract(), 0.0);
                last = applied;
            }
        }
    }

    #[test]
    fn test_fractional_driver_window_rounds_toward_zero() {
        let l = limits();
        // driver_max = 255 + (50 - 220.25) * 2 = -85.5, so no positive torque
        let applied = apply_std_steer_torque_limits(255.0, 0.0, -220.25, &l);
        assert_eq!(applied, 0.0);

        // driver_max = 255 + (50 - 127.3) * 2 = 100.4
        let applied = apply_std_steer_torque_limits(255.0, 100.0, -127.3, &l);
        assert_eq!(applied, 100.0);
    }
}
