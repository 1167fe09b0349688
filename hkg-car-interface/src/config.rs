//! Vehicle configuration types
//!
//! One `VehicleConfiguration` is loaded per drive session and never changes
//! afterwards. It tells the car interface which physical bus each relocated
//! ECU lives on, which optional signal sets the car carries, and the hard
//! safety limits the controller must respect.

use crate::models::{CarModel, GearSource};
use crate::types::{Bus, CarError, Result};
use serde::{Deserialize, Serialize};

/// Where a relocatable ECU (steering assist, angle sensor) is wired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusLocation {
    #[default]
    Default,
    Secondary,
}

impl BusLocation {
    /// Logical bus this location maps to
    pub fn bus(&self) -> Bus {
        match self {
            BusLocation::Default => Bus::Default,
            BusLocation::Secondary => Bus::Secondary,
        }
    }
}

/// Where the adaptive cruise unit is wired, if the car has one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CruiseBus {
    #[default]
    Default,
    Secondary,
    Camera,
    /// No radar; cruise state comes from the lever signals
    NoRadar,
}

impl CruiseBus {
    /// Bus used to read cruise signals and to send cruise buttons
    ///
    /// Without a radar the lever fallback signals live on the default bus.
    pub fn bus(&self) -> Bus {
        match self {
            CruiseBus::Default | CruiseBus::NoRadar => Bus::Default,
            CruiseBus::Secondary => Bus::Secondary,
            CruiseBus::Camera => Bus::Camera,
        }
    }

    /// True when the car has an adaptive cruise unit at all
    pub fn has_radar(&self) -> bool {
        !matches!(self, CruiseBus::NoRadar)
    }

    /// True when the cruise unit sits on a bus other than the default one
    pub fn is_off_default_bus(&self) -> bool {
        matches!(self, CruiseBus::Secondary | CruiseBus::Camera)
    }
}

/// Steering torque limits for the assist controller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteerLimits {
    /// Maximum absolute torque command
    pub max: f64,
    /// Maximum per-cycle increase in torque magnitude
    pub delta_up: f64,
    /// Maximum per-cycle decrease in torque magnitude
    pub delta_down: f64,
    /// Driver torque tolerated before the command window shrinks
    pub driver_allowance: f64,
    pub driver_multiplier: f64,
    pub driver_factor: f64,
    /// Driver torque above which the wheel counts as pressed
    pub threshold: f64,
}

impl Default for SteerLimits {
    fn default() -> Self {
        Self {
            max: 255.0,
            delta_up: 3.0,
            delta_down: 7.0,
            driver_allowance: 50.0,
            driver_multiplier: 2.0,
            driver_factor: 1.0,
            threshold: 150.0,
        }
    }
}

impl SteerLimits {
    /// Largest change the rate limiter allows in a single cycle
    pub fn max_delta(&self) -> f64 {
        self.delta_up.max(self.delta_down)
    }
}

/// Longitudinal acceleration limits in m/s^2
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccelLimits {
    pub min: f64,
    pub max: f64,
    /// Requests inside this band around the steady value are ignored
    pub hysteresis_gap: f64,
}

impl Default for AccelLimits {
    fn default() -> Self {
        Self {
            min: -3.0,
            max: 1.5,
            hysteresis_gap: 0.02,
        }
    }
}

impl AccelLimits {
    /// Factor converting a unitless gas/brake fraction to m/s^2
    pub fn scale(&self) -> f64 {
        self.max.max(-self.min)
    }
}

/// Immutable per-session vehicle configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleConfiguration {
    /// Vehicle model
    pub model: CarModel,

    /// Codec schema used to encode outgoing messages
    #[serde(default = "default_dbc")]
    pub dbc: String,

    /// Steering assist controller location
    #[serde(default)]
    pub mdps_bus: BusLocation,

    /// Steering angle sensor location
    #[serde(default)]
    pub sas_bus: BusLocation,

    /// Adaptive cruise unit location
    #[serde(default)]
    pub scc_bus: CruiseBus,

    /// Software commands acceleration through the cruise unit
    #[serde(default)]
    pub longitudinal_control: bool,

    /// Optional override of the model's gear message
    #[serde(default)]
    pub gear_source: Option<GearSource>,

    /// Optional override of the model's powertrain signal set
    #[serde(default)]
    pub electric_powertrain: Option<bool>,

    #[serde(default)]
    pub steer: SteerLimits,

    #[serde(default)]
    pub accel: AccelLimits,
}

fn default_dbc() -> String {
    "hyundai_kia_generic".to_string()
}

impl VehicleConfiguration {
    /// Create a configuration with every ECU on the default bus
    pub fn new(model: CarModel) -> Self {
        Self {
            model,
            dbc: default_dbc(),
            mdps_bus: BusLocation::Default,
            sas_bus: BusLocation::Default,
            scc_bus: CruiseBus::Default,
            longitudinal_control: false,
            gear_source: None,
            electric_powertrain: None,
            steer: SteerLimits::default(),
            accel: AccelLimits::default(),
        }
    }

    /// Create a configuration from a model identifier string
    pub fn for_model_name(name: &str) -> Result<Self> {
        Ok(Self::new(name.parse()?))
    }

    /// Builder method: set the steering assist bus
    pub fn with_mdps_bus(mut self, location: BusLocation) -> Self {
        self.mdps_bus = location;
        self
    }

    /// Builder method: set the steering angle sensor bus
    pub fn with_sas_bus(mut self, location: BusLocation) -> Self {
        self.sas_bus = location;
        self
    }

    /// Builder method: set the adaptive cruise unit bus
    pub fn with_scc_bus(mut self, location: CruiseBus) -> Self {
        self.scc_bus = location;
        self
    }

    /// Builder method: enable or disable longitudinal control
    pub fn with_longitudinal_control(mut self, enabled: bool) -> Self {
        self.longitudinal_control = enabled;
        self
    }

    /// Builder method: override the gear message
    pub fn with_gear_source(mut self, source: GearSource) -> Self {
        self.gear_source = Some(source);
        self
    }

    /// Builder method: override the powertrain signal set
    pub fn with_electric_powertrain(mut self, electric: bool) -> Self {
        self.electric_powertrain = Some(electric);
        self
    }

    /// Builder method: replace the steering limits
    pub fn with_steer_limits(mut self, limits: SteerLimits) -> Self {
        self.steer = limits;
        self
    }

    /// Builder method: replace the acceleration limits
    pub fn with_accel_limits(mut self, limits: AccelLimits) -> Self {
        self.accel = limits;
        self
    }

    /// Gear message in effect (override or model default)
    pub fn effective_gear_source(&self) -> GearSource {
        self.gear_source.unwrap_or_else(|| self.model.gear_source())
    }

    /// Powertrain signal set in effect (override or model default)
    pub fn uses_electric_powertrain(&self) -> bool {
        self.electric_powertrain
            .unwrap_or_else(|| self.model.has_electric_powertrain())
    }

    /// Check that the configuration is internally consistent
    ///
    /// A configuration that fails here must never be used to produce
    /// commands.
    pub fn validate(&self) -> Result<()> {
        let steer = &self.steer;
        if !(steer.max.is_finite() && steer.max > 0.0) {
            return Err(invalid(format!("steer.max must be positive, got {}", steer.max)));
        }
        if !(steer.delta_up > 0.0 && steer.delta_down > 0.0) {
            return Err(invalid(format!(
                "steer deltas must be positive, got up={} down={}",
                steer.delta_up, steer.delta_down
            )));
        }
        if [steer.max, steer.delta_up, steer.delta_down]
            .iter()
            .any(|limit| limit.fract() != 0.0)
        {
            return Err(invalid(format!(
                "steer limits must be whole torque units, got max={} up={} down={}",
                steer.max, steer.delta_up, steer.delta_down
            )));
        }
        if steer.driver_allowance < 0.0 || steer.driver_multiplier < 0.0 || steer.threshold < 0.0 {
            return Err(invalid("steer driver parameters must not be negative".to_string()));
        }

        let accel = &self.accel;
        if !(accel.min < 0.0 && accel.max > 0.0) {
            return Err(invalid(format!(
                "accel limits must straddle zero, got [{}, {}]",
                accel.min, accel.max
            )));
        }
        if !(accel.hysteresis_gap >= 0.0 && accel.hysteresis_gap.is_finite()) {
            return Err(invalid(format!(
                "accel.hysteresis_gap must be non-negative, got {}",
                accel.hysteresis_gap
            )));
        }

        if self.longitudinal_control && !self.scc_bus.has_radar() {
            return Err(invalid(
                "longitudinal control requires an adaptive cruise unit".to_string(),
            ));
        }
        if self.dbc.trim().is_empty() {
            return Err(invalid("dbc schema identifier is empty".to_string()));
        }

        Ok(())
    }
}

fn invalid(reason: String) -> CarError {
    CarError::InvalidConfig(reason)
}
