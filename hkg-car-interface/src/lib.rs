//! HKG Car Interface Library
//!
//! Vehicle-side core of a driver assistance stack for Hyundai, Kia and
//! Genesis cars. Each control cycle it turns decoded CAN signal snapshots
//! into a normalized vehicle state, and turns the control loop's actuator
//! request into the ordered list of CAN messages to send.
//!
//! # Architecture
//!
//! - [`CarState`] reads the three logical buses (default, secondary, camera)
//!   and produces a [`VehicleState`]
//! - [`CarController`] takes that state plus an [`ActuatorRequest`] and
//!   produces [`OutgoingMessage`]s in a fixed order
//! - [`CarInterface`] runs both once per cycle
//!
//! The library does NOT:
//! - Decode or encode CAN frames (signal values in, signal values out)
//! - Plan trajectories or decide when to engage
//! - Talk to hardware
//!
//! # Example Usage
//!
//! ```no_run
//! use hkg_car_interface::{
//!     ActuatorRequest, BusLocation, BusSnapshots, CarInterface, CarModel, CruiseBus,
//!     VehicleConfiguration,
//! };
//!
//! let config = VehicleConfiguration::new(CarModel::Kona)
//!     .with_mdps_bus(BusLocation::Secondary)
//!     .with_scc_bus(CruiseBus::NoRadar);
//! let mut interface = CarInterface::new(config).unwrap();
//!
//! let buses = BusSnapshots::default();
//! let output = interface.step(&buses, 0, &ActuatorRequest::default());
//! for msg in &output.messages {
//!     println!("{}", msg);
//! }
//! ```

// Public modules
pub mod config;
pub mod controller;
pub mod estimator;
pub mod hkgcan;
pub mod interface;
pub mod models;
pub mod types;

// Re-export main types for convenience
pub use config::{AccelLimits, BusLocation, CruiseBus, SteerLimits, VehicleConfiguration};
pub use controller::{CarController, ControllerState};
pub use estimator::{CarState, ContinuityState};
pub use interface::{CarInterface, CycleOutput};
pub use models::{CarModel, GearSource};
pub use types::{
    ActuatorRequest, Bus, BusSnapshots, CarError, CruiseState, GearShifter, MessageValues,
    OutgoingMessage, Result, SignalSnapshot, VehicleState, VisualAlert,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_every_model_builds_an_interface() {
        for model in CarModel::ALL {
            let config = VehicleConfiguration::new(model);
            assert!(CarInterface::new(config).is_ok(), "{} failed", model);
        }
    }
}
