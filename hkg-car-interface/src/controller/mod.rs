//! Actuator command synthesis
//!
//! `CarController` turns the control loop's actuator request plus the
//! current `VehicleState` into the ordered list of frames to put on the
//! buses this cycle. All cross-cycle memory lives in `ControllerState`.
//!
//! # Message order
//!
//! The order of the returned messages is part of the contract:
//!
//! 1. `LKAS11` on the default bus
//! 2. `LKAS11` on the secondary bus (assist controller or cruise unit there)
//! 3. `CLU11` echo to the assist controller's bus (when off the default bus)
//! 4. `CLU11` cancel press on the cruise bus, otherwise the `MDPS12`
//!    keep-alive to the camera bus (assist controller off the default bus)
//! 5. `SCC12` on even cycles under longitudinal control
//! 6. `CLU11` resume presses
//! 7. `LFAHDA_MFC` every fifth cycle on models with the lane following HUD

pub mod accel;
pub mod counters;
pub mod hud;
pub mod resume;
pub mod steer;

use crate::config::{BusLocation, CruiseBus, VehicleConfiguration};
use crate::hkgcan::{self, Button, LkasCommand};
use crate::types::{ActuatorRequest, Bus, OutgoingMessage, Result, VehicleState};
use accel::AccelShaper;
use counters::RollingCounter;
use hud::{process_hud_alert, HudInputs};
use resume::ResumeGenerator;
use steer::apply_std_steer_torque_limits;

/// Steering angle (deg) beyond which torque is never commanded
pub const MAX_STEER_ANGLE: f64 = 90.0;
/// Speed (m/s) below which the low speed steering fault workaround applies
pub const LOW_SPEED_STEER_LIMIT: f64 = 16.7;
/// Cycles steering stays suppressed once the workaround triggers
pub const STEER_SUPPRESS_CYCLES: u32 = 100;
/// Display speed reported to a relocated assist controller while steering
const ENABLED_SPEED_MPH: f64 = 34.0;
const ENABLED_SPEED_KPH: f64 = 55.0;

/// Cross-cycle memory of the controller
#[derive(Debug, Clone)]
pub struct ControllerState {
    pub accel: AccelShaper,
    pub apply_steer_last: f64,
    /// Last cycle's torque was altered by the limiter
    pub steer_rate_limited: bool,
    pub lkas11_counter: RollingCounter,
    pub scc12_counter: RollingCounter,
    pub resume: ResumeGenerator,
    /// Remaining cycles of steering suppression
    pub turning_signal_timer: u32,
}

impl ControllerState {
    fn new(config: &VehicleConfiguration) -> Self {
        Self {
            accel: AccelShaper::new(config.accel),
            apply_steer_last: 0.0,
            steer_rate_limited: false,
            lkas11_counter: RollingCounter::new(0x10),
            scc12_counter: RollingCounter::new(0xF),
            resume: ResumeGenerator::new(),
            turning_signal_timer: 0,
        }
    }
}

/// Per-session command synthesizer
#[derive(Debug, Clone)]
pub struct CarController {
    config: VehicleConfiguration,
    state: ControllerState,
    /// Resume presses sent this session
    resume_presses: u64,
}

impl CarController {
    /// Create a controller for a session
    ///
    /// Fails if the configuration does not validate; an invalid
    /// configuration never produces commands.
    pub fn new(config: &VehicleConfiguration) -> Result<Self> {
        config.validate()?;
        log::info!(
            "Car controller for {}: longitudinal={} lkas11 on secondary={}",
            config.model,
            config.longitudinal_control,
            sends_secondary_lkas11(config)
        );
        Ok(Self {
            config: config.clone(),
            state: ControllerState::new(config),
            resume_presses: 0,
        })
    }

    pub fn config(&self) -> &VehicleConfiguration {
        &self.config
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Resume presses emitted since construction
    pub fn resume_presses(&self) -> u64 {
        self.resume_presses
    }

    /// Run one control cycle
    pub fn update(
        &mut self,
        vehicle: &VehicleState,
        frame: u64,
        request: &ActuatorRequest,
    ) -> Vec<OutgoingMessage> {
        let config = &self.config;
        let st = &mut self.state;

        // longitudinal
        let apply_accel = st.accel.apply(request.gas, request.brake);

        // lateral
        let new_steer = request.steer * config.steer.max;
        let mut apply_steer = apply_std_steer_torque_limits(
            new_steer,
            st.apply_steer_last,
            vehicle.steering_torque,
            &config.steer,
        );
        st.steer_rate_limited = new_steer != apply_steer;

        // past 90 degrees some assist controllers hard fault
        let mut lkas_active = request.enabled && vehicle.steering_angle.abs() < MAX_STEER_ANGLE;

        if vehicle.v_ego < LOW_SPEED_STEER_LIMIT
            && config.model.has_low_speed_steer_fault()
            && config.mdps_bus == BusLocation::Default
        {
            if st.turning_signal_timer == 0 {
                log::debug!("Frame {}: low speed steering suppression armed", frame);
            }
            st.turning_signal_timer = STEER_SUPPRESS_CYCLES;
        }
        if st.turning_signal_timer > 0 {
            lkas_active = false;
            st.turning_signal_timer -= 1;
        }

        if !lkas_active {
            apply_steer = 0.0;
        }
        st.apply_steer_last = apply_steer;

        let hud = process_hud_alert(
            config.model,
            &HudInputs {
                lkas_active,
                visual_alert: request.visual_alert,
                left_lane: request.left_lane_visible,
                right_lane: request.right_lane_visible,
                left_lane_depart: request.left_lane_depart,
                right_lane_depart: request.right_lane_depart,
                button_on: vehicle.lkas_button_on,
            },
        );

        let clu11_speed = vehicle.raw.clu11.get("CF_Clu_Vanz").copied().unwrap_or(0.0);
        let mut enabled_speed = if vehicle.is_set_speed_in_mph {
            ENABLED_SPEED_MPH
        } else {
            ENABLED_SPEED_KPH
        };
        if clu11_speed > enabled_speed || !lkas_active {
            enabled_speed = clu11_speed;
        }

        if !st.lkas11_counter.is_seeded() {
            let observed_lkas = vehicle.raw.lkas11.get("CF_Lkas_MsgCount").copied().unwrap_or(0.0);
            let observed_scc = if config.scc_bus.has_radar() {
                vehicle.raw.scc12.get("CR_VSM_Alive").copied().unwrap_or(0.0)
            } else {
                0.0
            };
            st.lkas11_counter.seed(observed_lkas);
            st.scc12_counter.seed(observed_scc);
            log::debug!(
                "Frame {}: counters seeded lkas11={} scc12={}",
                frame,
                st.lkas11_counter.value(),
                st.scc12_counter.value()
            );
        }
        let lkas11_count = st.lkas11_counter.advance();

        let mut messages = Vec::with_capacity(8);

        let lkas_command = LkasCommand {
            apply_steer,
            steer_req: lkas_active,
            hud,
            enabled: request.enabled,
            left_lane: request.left_lane_visible,
            right_lane: request.right_lane_visible,
            counter: lkas11_count,
        };
        messages.push(hkgcan::create_lkas11(
            config.model,
            &vehicle.raw.lkas11,
            &lkas_command,
            Bus::Default,
        ));
        if sends_secondary_lkas11(config) {
            messages.push(hkgcan::create_lkas11(
                config.model,
                &vehicle.raw.lkas11,
                &lkas_command,
                Bus::Secondary,
            ));
        }

        let mdps_relocated = config.mdps_bus != BusLocation::Default;
        if mdps_relocated {
            messages.push(hkgcan::create_clu11(
                frame,
                config.mdps_bus.bus(),
                &vehicle.raw.clu11,
                Button::None,
                enabled_speed,
            ));
        }

        if request.cancel_requested && config.longitudinal_control {
            messages.push(hkgcan::create_clu11(
                frame,
                config.scc_bus.bus(),
                &vehicle.raw.clu11,
                Button::Cancel,
                clu11_speed,
            ));
        } else if mdps_relocated {
            messages.push(hkgcan::create_mdps12(frame, &vehicle.raw.mdps12));
        }

        if config.scc_bus.is_off_default_bus() && config.longitudinal_control && frame % 2 == 0 {
            let count = st.scc12_counter.advance();
            messages.push(hkgcan::create_scc12(
                apply_accel,
                request.enabled,
                count,
                &vehicle.raw.scc12,
            ));
        }

        if st.resume.update(vehicle.standstill, vehicle.lead_distance, frame) {
            self.resume_presses += 1;
            messages.push(hkgcan::create_clu11(
                frame,
                config.scc_bus.bus(),
                &vehicle.raw.clu11,
                Button::ResAccel,
                clu11_speed,
            ));
        }

        if frame % 5 == 0 && config.model.sends_lfa_mfa() {
            messages.push(hkgcan::create_lfa_mfa(request.enabled));
        }

        for msg in &messages {
            log::trace!("Frame {}: {}", frame, msg);
        }
        messages
    }
}

/// The lane keep frame is duplicated when a receiver sits on the secondary bus
fn sends_secondary_lkas11(config: &VehicleConfiguration) -> bool {
    config.mdps_bus == BusLocation::Secondary || config.scc_bus == CruiseBus::Secondary
}
