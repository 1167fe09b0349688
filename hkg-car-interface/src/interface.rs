//! One-call-per-cycle facade over the estimator and the controller

use crate::config::VehicleConfiguration;
use crate::controller::CarController;
use crate::estimator::CarState;
use crate::types::{ActuatorRequest, BusSnapshots, OutgoingMessage, Result, VehicleState};
use serde::Serialize;

/// Result of one control cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleOutput {
    pub frame: u64,
    pub state: VehicleState,
    pub messages: Vec<OutgoingMessage>,
}

/// Estimator and controller for one drive session
///
/// Both halves are built from the same validated configuration. Each call
/// to [`CarInterface::step`] runs the estimator and then the controller,
/// exactly once, in that order.
#[derive(Debug)]
pub struct CarInterface {
    car_state: CarState,
    controller: CarController,
    cycles: u64,
}

impl CarInterface {
    pub fn new(config: VehicleConfiguration) -> Result<Self> {
        let car_state = CarState::new(&config)?;
        let controller = CarController::new(&config)?;
        Ok(Self {
            car_state,
            controller,
            cycles: 0,
        })
    }

    /// Process one cycle
    pub fn step(
        &mut self,
        buses: &BusSnapshots,
        frame: u64,
        request: &ActuatorRequest,
    ) -> CycleOutput {
        let state = self.car_state.update_buses(buses);
        let messages = self.controller.update(&state, frame, request);
        self.cycles += 1;
        CycleOutput {
            frame,
            state,
            messages,
        }
    }

    pub fn config(&self) -> &VehicleConfiguration {
        self.controller.config()
    }

    pub fn car_state(&self) -> &CarState {
        &self.car_state
    }

    pub fn controller(&self) -> &CarController {
        &self.controller
    }

    /// Cycles processed so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}
