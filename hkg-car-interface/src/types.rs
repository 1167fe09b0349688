//! Core types for the HKG car interface
//!
//! This module defines the values that flow through one control cycle: the
//! per-bus signal snapshots coming in, the normalized vehicle state handed to
//! downstream consumers, the actuator request coming back, and the outgoing
//! messages handed to the codec.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Result type for car interface operations
pub type Result<T> = std::result::Result<T, CarError>;

/// Errors that can occur while setting up a car interface session
///
/// Per-cycle processing never fails; every variant here is an
/// initialization error and the session refuses to start.
#[derive(Debug, thiserror::Error)]
pub enum CarError {
    #[error("Unknown car model: {0}")]
    UnknownModel(String),

    #[error("Invalid vehicle configuration: {0}")]
    InvalidConfig(String),
}

/// Logical CAN bus as seen by the car interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bus {
    /// Powertrain bus (bus 0)
    Default,
    /// Second harness bus used by relocated ECUs (bus 1)
    Secondary,
    /// Forward camera bus (bus 2)
    Camera,
}

impl Bus {
    /// Bus index as used by the codec
    pub fn index(&self) -> u8 {
        match self {
            Bus::Default => 0,
            Bus::Secondary => 1,
            Bus::Camera => 2,
        }
    }
}

impl fmt::Display for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bus::Default => write!(f, "default"),
            Bus::Secondary => write!(f, "secondary"),
            Bus::Camera => write!(f, "camera"),
        }
    }
}

/// Signal values of a single message (signal name -> physical value)
pub type MessageValues = BTreeMap<String, f64>;

/// One cycle's worth of decoded signal values for a single logical bus
///
/// Keyed by message name, then signal name. Missing messages or signals read
/// as `0.0`, which is the bus provider's default-value policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalSnapshot {
    messages: BTreeMap<String, MessageValues>,
}

impl SignalSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set a single signal value
    pub fn with_signal(mut self, message: &str, signal: &str, value: f64) -> Self {
        self.set(message, signal, value);
        self
    }

    /// Set a single signal value
    pub fn set(&mut self, message: &str, signal: &str, value: f64) {
        self.messages
            .entry(message.to_string())
            .or_default()
            .insert(signal.to_string(), value);
    }

    /// Read a signal value, defaulting to `0.0`
    pub fn get(&self, message: &str, signal: &str) -> f64 {
        self.messages
            .get(message)
            .and_then(|values| values.get(signal))
            .copied()
            .unwrap_or(0.0)
    }

    /// Read a signal as a flag (non-zero is asserted)
    pub fn flag(&self, message: &str, signal: &str) -> bool {
        self.get(message, signal) != 0.0
    }

    /// Copy out every signal of a message (empty if the message is absent)
    pub fn message(&self, message: &str) -> MessageValues {
        self.messages.get(message).cloned().unwrap_or_default()
    }
}

/// The three logical buses sampled in one cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusSnapshots {
    #[serde(default)]
    pub default: SignalSnapshot,
    #[serde(default)]
    pub secondary: SignalSnapshot,
    #[serde(default)]
    pub camera: SignalSnapshot,
}

/// Gear selector position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GearShifter {
    Park,
    Reverse,
    Neutral,
    Drive,
    #[default]
    Unknown,
}

impl fmt::Display for GearShifter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GearShifter::Park => "P",
            GearShifter::Reverse => "R",
            GearShifter::Neutral => "N",
            GearShifter::Drive => "D",
            GearShifter::Unknown => "?",
        };
        write!(f, "{}", name)
    }
}

/// Visual alert requested by the control loop for the HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VisualAlert {
    #[default]
    None,
    Fcw,
    SteerRequired,
    BrakePressed,
    WrongGear,
    SeatbeltUnbuckled,
    SpeedTooHigh,
    LdwLeft,
    LdwRight,
}

/// Cruise control status
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CruiseState {
    pub enabled: bool,
    pub available: bool,
    pub standstill: bool,
    /// Set speed in m/s, never negative
    pub speed: f64,
}

/// Individual wheel speeds in m/s
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WheelSpeeds {
    pub fl: f64,
    pub fr: f64,
    pub rl: f64,
    pub rr: f64,
}

/// Verbatim copies of the messages the controller rebuilds its frames on
///
/// The controller patches a handful of fields into these and forwards the
/// rest untouched, so they must be the exact values last seen on the bus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEchoes {
    /// Lane keep assist status (camera bus)
    pub lkas11: MessageValues,
    /// Cluster speed and switch state (default bus)
    pub clu11: MessageValues,
    /// Cruise command status (cruise unit bus)
    pub scc12: MessageValues,
    /// Steering assist status (assist controller bus)
    pub mdps12: MessageValues,
}

/// Normalized vehicle state produced once per cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// Filtered speed in m/s
    pub v_ego: f64,
    /// Filtered acceleration in m/s^2
    pub a_ego: f64,
    /// Unfiltered mean wheel speed in m/s
    pub v_ego_raw: f64,
    pub wheel_speeds: WheelSpeeds,
    pub standstill: bool,

    /// Steering wheel angle in degrees
    pub steering_angle: f64,
    pub steering_rate: f64,
    /// Driver column torque
    pub steering_torque: f64,
    /// Assist motor output torque
    pub steering_torque_eps: f64,
    pub steering_pressed: bool,
    pub steer_warning: bool,
    /// Assist controller reports torque input active
    pub steer_state: bool,
    pub yaw_rate: f64,

    pub door_open: bool,
    pub seatbelt_unlatched: bool,
    pub park_brake: bool,
    pub esp_disabled: bool,

    pub left_blinker_on: bool,
    pub right_blinker_on: bool,
    pub left_blinker_flash: bool,
    pub right_blinker_flash: bool,

    pub cruise_state: CruiseState,
    /// Cluster shows speeds in mph
    pub is_set_speed_in_mph: bool,
    pub gear_shifter: GearShifter,

    pub left_blindspot: bool,
    pub right_blindspot: bool,
    pub lca_state: f64,

    /// Accelerator pedal position as a fraction
    pub gas: f64,
    pub gas_pressed: bool,
    pub brake_pressed: bool,
    pub brake_lights: bool,

    /// Distance to the lead vehicle as reported by the cruise unit
    pub lead_distance: f64,

    /// Last non-fault lane keep system state (0 means the LKAS button is off)
    pub lkas_button_on: bool,
    /// Latched lane keep fusion fault
    pub lkas_fault: bool,

    pub raw: RawEchoes,
}

/// Request coming back from the control loop for one cycle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorRequest {
    /// Overall control engaged
    pub enabled: bool,
    /// Gas fraction, 0..=1
    pub gas: f64,
    /// Brake fraction, 0..=1
    pub brake: f64,
    /// Steering fraction, -1..=1
    pub steer: f64,
    /// Ask the cruise unit to cancel
    pub cancel_requested: bool,
    pub visual_alert: VisualAlert,
    pub left_lane_visible: bool,
    pub right_lane_visible: bool,
    pub left_lane_depart: bool,
    pub right_lane_depart: bool,
}

/// A message ready for the codec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    /// Target bus
    pub bus: Bus,
    /// Message name in the codec schema
    pub name: String,
    /// Signal values to encode
    pub signals: MessageValues,
}

impl OutgoingMessage {
    /// Create a new outgoing message
    pub fn new(bus: Bus, name: impl Into<String>, signals: MessageValues) -> Self {
        Self {
            bus,
            name: name.into(),
            signals,
        }
    }

    /// Read back a signal value (0.0 if the signal is not set)
    pub fn signal(&self, name: &str) -> f64 {
        self.signals.get(name).copied().unwrap_or(0.0)
    }
}

impl fmt::Display for OutgoingMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} ({} signals)", self.name, self.bus, self.signals.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_defaults_to_zero() {
        let snapshot = SignalSnapshot::new().with_signal("CLU11", "CF_Clu_Vanz", 42.0);

        assert_eq!(snapshot.get("CLU11", "CF_Clu_Vanz"), 42.0);
        assert_eq!(snapshot.get("CLU11", "CF_Clu_SPEED_UNIT"), 0.0);
        assert_eq!(snapshot.get("SCC11", "VSetDis"), 0.0);
        assert!(!snapshot.flag("CGW1", "CF_Gway_DrvDrSw"));
        assert!(snapshot.message("LKAS11").is_empty());
    }

    #[test]
    fn test_snapshot_message_copy_is_detached() {
        let mut snapshot = SignalSnapshot::new().with_signal("MDPS12", "CF_Mdps_ToiActive", 1.0);
        let copy = snapshot.message("MDPS12");
        snapshot.set("MDPS12", "CF_Mdps_ToiActive", 0.0);

        assert_eq!(copy.get("CF_Mdps_ToiActive"), Some(&1.0));
    }

    #[test]
    fn test_snapshot_json_shape() {
        let json = r#"{"CLU11": {"CF_Clu_Vanz": 12.0}}"#;
        let snapshot: SignalSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.get("CLU11", "CF_Clu_Vanz"), 12.0);
    }

    #[test]
    fn test_bus_display_and_index() {
        assert_eq!(format!("{}", Bus::Camera), "camera");
        assert_eq!(Bus::Secondary.index(), 1);
    }

    #[test]
    fn test_actuator_request_partial_json() {
        let request: ActuatorRequest =
            serde_json::from_str(r#"{"enabled": true, "visual_alert": "steerRequired"}"#).unwrap();
        assert!(request.enabled);
        assert_eq!(request.visual_alert, VisualAlert::SteerRequired);
        assert_eq!(request.gas, 0.0);
    }
}
