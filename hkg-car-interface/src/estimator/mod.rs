//! Vehicle state estimation
//!
//! `CarState` turns the three per-cycle bus snapshots into a normalized
//! `VehicleState`. It owns every piece of cross-cycle memory the decoding
//! needs (blinker debouncing, the low-speed cruise latch, the lane keep
//! fault latch) in a single `ContinuityState`.
//!
//! # Bus routing
//!
//! Some trims wire the steering assist controller, the steering angle sensor
//! or the adaptive cruise unit to a secondary harness bus, and some carry the
//! cruise unit on the camera bus. Each cycle the estimator reads those
//! subsystems from whichever snapshot the configuration names.

pub mod blinker;
pub mod cruise;
pub mod gear;
pub mod speed_filter;

use crate::config::{BusLocation, CruiseBus, VehicleConfiguration};
use crate::types::{
    BusSnapshots, RawEchoes, Result, SignalSnapshot, VehicleState, WheelSpeeds,
};
use blinker::Blinker;
use cruise::{CruiseInputs, CruiseTracker, KPH_TO_MS};
use gear::GearDecoder;
use speed_filter::{Kf1dSpeedFilter, SpeedFilter};

/// Raw speed (m/s) below which the car is at standstill
pub const STANDSTILL_SPEED: f64 = 0.1;
/// Lane keep system state code reported on a fault
pub const LKAS_FAULT_STATE: f64 = 7.0;
/// SCC info display code shown while held at standstill
const SCC_STANDSTILL_DISPLAY: f64 = 4.0;
/// Electric accelerator position (percent) treated as pressed
const ELECTRIC_GAS_PRESSED: f64 = 5.0;

/// Lane keep fault latch
///
/// A fault report latches until the camera reports an active fusion state
/// again, so the HUD does not flicker while the camera recovers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LkasMonitor {
    faulted: bool,
    button_on: bool,
}

impl Default for LkasMonitor {
    fn default() -> Self {
        Self {
            faulted: false,
            button_on: true,
        }
    }
}

impl LkasMonitor {
    /// Feed the camera's system state and fusion state for one cycle
    pub fn update(&mut self, sys_state: f64, fusion_state: f64) {
        if sys_state == LKAS_FAULT_STATE {
            if !self.faulted {
                log::debug!("Lane keep fault latched");
            }
            self.faulted = true;
            return;
        }

        self.button_on = sys_state != 0.0;
        if self.faulted && fusion_state == 0.0 {
            log::debug!("Lane keep fault cleared by active fusion");
            self.faulted = false;
        }
    }

    pub fn faulted(&self) -> bool {
        self.faulted
    }

    /// LKAS button state from the last non-fault report
    pub fn button_on(&self) -> bool {
        self.button_on
    }
}

/// Cross-cycle memory of the estimator
#[derive(Debug, Clone, Default)]
pub struct ContinuityState {
    pub left_blinker: Blinker,
    pub right_blinker: Blinker,
    pub cruise: CruiseTracker,
    pub lkas: LkasMonitor,
}

/// Per-session state estimator
pub struct CarState {
    config: VehicleConfiguration,
    gear_decoder: GearDecoder,
    electric_powertrain: bool,
    speed_filter: Box<dyn SpeedFilter>,
    continuity: ContinuityState,
}

impl std::fmt::Debug for CarState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarState")
            .field("model", &self.config.model)
            .field("gear_decoder", &self.gear_decoder)
            .field("electric_powertrain", &self.electric_powertrain)
            .field("continuity", &self.continuity)
            .finish()
    }
}

impl CarState {
    /// Create an estimator with the default speed filter
    ///
    /// Fails if the configuration does not validate.
    pub fn new(config: &VehicleConfiguration) -> Result<Self> {
        Self::with_speed_filter(config, Box::new(Kf1dSpeedFilter::new()))
    }

    /// Create an estimator with a custom speed filter
    pub fn with_speed_filter(
        config: &VehicleConfiguration,
        speed_filter: Box<dyn SpeedFilter>,
    ) -> Result<Self> {
        config.validate()?;

        let gear_decoder = GearDecoder::from(config.effective_gear_source());
        let electric_powertrain = config.uses_electric_powertrain();
        log::info!(
            "Car state for {}: gears via {:?}, {} powertrain, mdps={:?} sas={:?} scc={:?}",
            config.model,
            gear_decoder,
            if electric_powertrain { "electric" } else { "combustion" },
            config.mdps_bus,
            config.sas_bus,
            config.scc_bus
        );

        Ok(Self {
            config: config.clone(),
            gear_decoder,
            electric_powertrain,
            speed_filter,
            continuity: ContinuityState::default(),
        })
    }

    /// Session configuration
    pub fn config(&self) -> &VehicleConfiguration {
        &self.config
    }

    /// Cross-cycle memory (read-only)
    pub fn continuity(&self) -> &ContinuityState {
        &self.continuity
    }

    /// Decode one cycle
    ///
    /// # Arguments
    /// * `cp` - default (powertrain) bus snapshot
    /// * `cp2` - secondary bus snapshot
    /// * `cp_cam` - camera bus snapshot
    pub fn update(
        &mut self,
        cp: &SignalSnapshot,
        cp2: &SignalSnapshot,
        cp_cam: &SignalSnapshot,
    ) -> VehicleState {
        let cp_mdps = pick(self.config.mdps_bus, cp, cp2);
        let cp_sas = pick(self.config.sas_bus, cp, cp2);
        let cp_scc = match self.config.scc_bus {
            CruiseBus::Secondary => cp2,
            CruiseBus::Camera => cp_cam,
            CruiseBus::Default | CruiseBus::NoRadar => cp,
        };
        let has_radar = self.config.scc_bus.has_radar();

        let mut ret = VehicleState {
            door_open: cp.flag("CGW1", "CF_Gway_DrvDrSw"),
            seatbelt_unlatched: !cp.flag("CGW1", "CF_Gway_DrvSeatBeltSw"),
            park_brake: cp.flag("CGW1", "CF_Gway_ParkBrakeSw"),
            ..VehicleState::default()
        };

        // speed
        ret.wheel_speeds = WheelSpeeds {
            fl: cp.get("WHL_SPD11", "WHL_SPD_FL") * KPH_TO_MS,
            fr: cp.get("WHL_SPD11", "WHL_SPD_FR") * KPH_TO_MS,
            rl: cp.get("WHL_SPD11", "WHL_SPD_RL") * KPH_TO_MS,
            rr: cp.get("WHL_SPD11", "WHL_SPD_RR") * KPH_TO_MS,
        };
        let ws = &ret.wheel_speeds;
        ret.v_ego_raw = (ws.fl + ws.fr + ws.rl + ws.rr) / 4.0;
        let (v_ego, a_ego) = self.speed_filter.update(ret.v_ego_raw);
        ret.v_ego = v_ego;
        ret.a_ego = a_ego;
        ret.standstill = ret.v_ego_raw < STANDSTILL_SPEED;

        // steering
        ret.steering_angle = cp_sas.get("SAS11", "SAS_Angle");
        ret.steering_rate = cp_sas.get("SAS11", "SAS_Speed");
        ret.yaw_rate = cp.get("ESP12", "YAW_RATE");
        ret.steering_torque = cp_mdps.get("MDPS12", "CR_Mdps_StrColTq");
        ret.steering_torque_eps = cp_mdps.get("MDPS12", "CR_Mdps_OutTq");
        ret.steering_pressed = ret.steering_torque.abs() > self.config.steer.threshold;
        ret.steer_warning = cp_mdps.flag("MDPS12", "CF_Mdps_ToiFlt");
        ret.steer_state = cp_mdps.flag("MDPS12", "CF_Mdps_ToiActive");

        // blinkers
        let left = self.continuity.left_blinker.update(
            ret.v_ego,
            cp.flag("CGW1", "CF_Gway_TSigLHSw"),
            cp.flag("CGW1", "CF_Gway_TurnSigLh"),
        );
        let right = self.continuity.right_blinker.update(
            ret.v_ego,
            cp.flag("CGW1", "CF_Gway_TSigRHSw"),
            cp.flag("CGW1", "CF_Gway_TurnSigRh"),
        );
        ret.left_blinker_on = left.on;
        ret.left_blinker_flash = left.flash;
        ret.right_blinker_on = right.on;
        ret.right_blinker_flash = right.flash;

        // cruise
        ret.is_set_speed_in_mph = cp.flag("CLU11", "CF_Clu_SPEED_UNIT");
        let cruise_inputs = if has_radar {
            CruiseInputs {
                enabled: cp_scc.flag("SCC12", "ACCMode"),
                available: cp_scc.flag("SCC11", "MainMode_ACC"),
                standstill: cp_scc.get("SCC11", "SCCInfoDisplay") == SCC_STANDSTILL_DISPLAY,
                set_speed: cp_scc.get("SCC11", "VSetDis"),
                ..CruiseInputs::default()
            }
        } else {
            CruiseInputs {
                enabled: cp.flag("LVR12", "CF_Lvr_CruiseSet"),
                available: cp.flag("EMS16", "CRUISE_LAMP_M"),
                standstill: false,
                set_speed: cp.get("LVR12", "CF_Lvr_CruiseSet"),
                ..CruiseInputs::default()
            }
        };
        ret.cruise_state = self.continuity.cruise.update(&CruiseInputs {
            cluster_speed: cp.get("CLU11", "CF_Clu_Vanz"),
            switch_state: cp.get("CLU11", "CF_Clu_CruiseSwState"),
            speed_in_mph: ret.is_set_speed_in_mph,
            ..cruise_inputs
        });
        ret.lead_distance = cp_scc.get("SCC11", "ACC_ObjDist");

        // pedals
        ret.brake_pressed = cp.flag("TCS13", "DriverBraking");
        ret.brake_lights = cp.flag("TCS13", "BrakeLight") || ret.brake_pressed;
        if self.electric_powertrain {
            let position = cp.get("E_EMS11", "Accel_Pedal_Pos");
            ret.gas = position / 100.0;
            ret.gas_pressed = position > ELECTRIC_GAS_PRESSED;
        } else {
            ret.gas = cp.get("EMS12", "PV_AV_CAN") / 100.0;
            ret.gas_pressed = cp.flag("EMS16", "CF_Ems_AclAct");
        }
        ret.esp_disabled = cp.flag("TCS15", "ESC_Off_Step");

        ret.gear_shifter = self.gear_decoder.decode(cp);

        // blind spot
        ret.lca_state = cp.get("LCA11", "CF_Lca_Stat");
        ret.left_blindspot = cp.flag("LCA11", "CF_Lca_IndLeft");
        ret.right_blindspot = cp.flag("LCA11", "CF_Lca_IndRight");

        // lane keep status
        self.continuity.lkas.update(
            cp_cam.get("LKAS11", "CF_Lkas_LdwsSysState"),
            cp_cam.get("LKAS11", "CF_Lkas_FusionState"),
        );
        ret.lkas_fault = self.continuity.lkas.faulted();
        ret.lkas_button_on = self.continuity.lkas.button_on();

        ret.raw = RawEchoes {
            lkas11: cp_cam.message("LKAS11"),
            clu11: cp.message("CLU11"),
            scc12: cp_scc.message("SCC12"),
            mdps12: cp_mdps.message("MDPS12"),
        };

        ret
    }

    /// Decode one cycle from a bundle of all three buses
    pub fn update_buses(&mut self, buses: &BusSnapshots) -> VehicleState {
        self.update(&buses.default, &buses.secondary, &buses.camera)
    }
}

fn pick<'a>(
    location: BusLocation,
    cp: &'a SignalSnapshot,
    cp2: &'a SignalSnapshot,
) -> &'a SignalSnapshot {
    match location {
        BusLocation::Default => cp,
        BusLocation::Secondary => cp2,
    }
}
