//! Gear selector decoding
//!
//! Each car reports its gear through exactly one of four messages. The
//! decoder is picked once from the configuration and never re-evaluated.

use crate::models::GearSource;
use crate::types::{GearShifter, SignalSnapshot};

/// Gear decoding strategy, fixed for the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GearDecoder {
    /// CLU15 inhibit lamps
    Cluster,
    /// TCU12 current gear
    Tcu,
    /// ELECT_GEAR shifter position
    Electric,
    /// LVR12 lever position
    Lever,
}

impl From<GearSource> for GearDecoder {
    fn from(source: GearSource) -> Self {
        match source {
            GearSource::Cluster => GearDecoder::Cluster,
            GearSource::Tcu => GearDecoder::Tcu,
            GearSource::Electric => GearDecoder::Electric,
            GearSource::Lever => GearDecoder::Lever,
        }
    }
}

impl GearDecoder {
    /// Decode the gear from the default-bus snapshot
    pub fn decode(&self, cp: &SignalSnapshot) -> GearShifter {
        match self {
            GearDecoder::Cluster => decode_cluster(
                cp.get("CLU15", "CF_Clu_InhibitD"),
                cp.get("CLU15", "CF_Clu_InhibitN"),
                cp.get("CLU15", "CF_Clu_InhibitP"),
                cp.get("CLU15", "CF_Clu_InhibitR"),
            ),
            GearDecoder::Tcu => decode_tcu(cp.get("TCU12", "CUR_GR")),
            GearDecoder::Electric => {
                decode_shifter(cp.get("ELECT_GEAR", "Elect_Gear_Shifter"))
            }
            GearDecoder::Lever => decode_shifter(cp.get("LVR12", "CF_Lvr_Gear")),
        }
    }
}

/// Inhibit lamps are checked in D, N, P, R order
fn decode_cluster(d: f64, n: f64, p: f64, r: f64) -> GearShifter {
    if d == 1.0 {
        GearShifter::Drive
    } else if n == 1.0 {
        GearShifter::Neutral
    } else if p == 1.0 {
        GearShifter::Park
    } else if r == 1.0 {
        GearShifter::Reverse
    } else {
        GearShifter::Unknown
    }
}

/// 0 = P, 1..=8 = forward gears, 14 = R
fn decode_tcu(gear: f64) -> GearShifter {
    if gear == 0.0 {
        GearShifter::Park
    } else if gear == 14.0 {
        GearShifter::Reverse
    } else if gear > 0.0 && gear < 9.0 {
        GearShifter::Drive
    } else {
        GearShifter::Unknown
    }
}

/// 0 = P, 5 = D, 6 = N, 7 = R, 8 = sport
fn decode_shifter(gear: f64) -> GearShifter {
    match gear as i64 {
        _ if gear.fract() != 0.0 => GearShifter::Unknown,
        5 | 8 => GearShifter::Drive,
        6 => GearShifter::Neutral,
        0 => GearShifter::Park,
        7 => GearShifter::Reverse,
        _ => GearShifter::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(message: &str, signal: &str, value: f64) -> SignalSnapshot {
        SignalSnapshot::new().with_signal(message, signal, value)
    }

    #[test]
    fn test_cluster_gears() {
        let decoder = GearDecoder::Cluster;
        let cases = [
            ("CF_Clu_InhibitD", GearShifter::Drive),
            ("CF_Clu_InhibitN", GearShifter::Neutral),
            ("CF_Clu_InhibitP", GearShifter::Park),
            ("CF_Clu_InhibitR", GearShifter::Reverse),
        ];
        for (signal, expected) in cases {
            assert_eq!(decoder.decode(&snapshot("CLU15", signal, 1.0)), expected);
        }
        assert_eq!(decoder.decode(&SignalSnapshot::new()), GearShifter::Unknown);
        assert_eq!(
            decoder.decode(&snapshot("CLU15", "CF_Clu_InhibitD", 2.0)),
            GearShifter::Unknown
        );
    }

    #[test]
    fn test_cluster_drive_wins_over_others() {
        let cp = SignalSnapshot::new()
            .with_signal("CLU15", "CF_Clu_InhibitP", 1.0)
            .with_signal("CLU15", "CF_Clu_InhibitD", 1.0);
        assert_eq!(GearDecoder::Cluster.decode(&cp), GearShifter::Drive);
    }

    #[test]
    fn test_tcu_gears() {
        let decoder = GearDecoder::Tcu;
        assert_eq!(decoder.decode(&snapshot("TCU12", "CUR_GR", 0.0)), GearShifter::Park);
        assert_eq!(decoder.decode(&snapshot("TCU12", "CUR_GR", 14.0)), GearShifter::Reverse);
        for gear in 1..=8 {
            assert_eq!(
                decoder.decode(&snapshot("TCU12", "CUR_GR", gear as f64)),
                GearShifter::Drive
            );
        }
        assert_eq!(decoder.decode(&snapshot("TCU12", "CUR_GR", 9.0)), GearShifter::Unknown);
        assert_eq!(decoder.decode(&snapshot("TCU12", "CUR_GR", 15.0)), GearShifter::Unknown);
    }

    #[test]
    fn test_electric_gears() {
        let decoder = GearDecoder::Electric;
        let cases = [
            (0.0, GearShifter::Park),
            (5.0, GearShifter::Drive),
            (6.0, GearShifter::Neutral),
            (7.0, GearShifter::Reverse),
            (8.0, GearShifter::Drive),
            (3.0, GearShifter::Unknown),
        ];
        for (code, expected) in cases {
            assert_eq!(
                decoder.decode(&snapshot("ELECT_GEAR", "Elect_Gear_Shifter", code)),
                expected
            );
        }
    }

    #[test]
    fn test_lever_gears() {
        let decoder = GearDecoder::Lever;
        let cases = [
            (0.0, GearShifter::Park),
            (5.0, GearShifter::Drive),
            (6.0, GearShifter::Neutral),
            (7.0, GearShifter::Reverse),
            (8.0, GearShifter::Drive),
            (1.0, GearShifter::Unknown),
            (5.5, GearShifter::Unknown),
        ];
        for (code, expected) in cases {
            assert_eq!(decoder.decode(&snapshot("LVR12", "CF_Lvr_Gear", code)), expected);
        }
    }

    #[test]
    fn test_decoder_from_source() {
        assert_eq!(GearDecoder::from(GearSource::Tcu), GearDecoder::Tcu);
        assert_eq!(GearDecoder::from(GearSource::Lever), GearDecoder::Lever);
    }
}
