//! Outgoing message builders
//!
//! Every builder starts from the exact values last seen on the bus for that
//! message and patches only the fields the controller owns. Checksum fields
//! are zeroed; the codec computes them when it packs the frame.

use crate::controller::hud::HudAlert;
use crate::models::CarModel;
use crate::types::{Bus, MessageValues, OutgoingMessage};

pub const LKAS11: &str = "LKAS11";
pub const CLU11: &str = "CLU11";
pub const MDPS12: &str = "MDPS12";
pub const SCC12: &str = "SCC12";
pub const LFAHDA_MFC: &str = "LFAHDA_MFC";

/// Steering wheel cruise buttons as encoded in `CF_Clu_CruiseSwState`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    None = 0,
    ResAccel = 1,
    SetDecel = 2,
    GapDist = 3,
    Cancel = 4,
}

impl Button {
    pub fn code(self) -> f64 {
        self as u8 as f64
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Fields of the lane keep status frame owned by the controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LkasCommand {
    pub apply_steer: f64,
    pub steer_req: bool,
    pub hud: HudAlert,
    pub enabled: bool,
    pub left_lane: bool,
    pub right_lane: bool,
    pub counter: u8,
}

/// Lane keep status + steering torque request
pub fn create_lkas11(
    model: CarModel,
    lkas11: &MessageValues,
    command: &LkasCommand,
    bus: Bus,
) -> OutgoingMessage {
    let mut values = lkas11.clone();
    let camera_warning = lkas11.get("CF_Lkas_SysWarning").copied().unwrap_or(0.0);
    let lane_bits = flag(command.left_lane) + 2.0 * flag(command.right_lane);
    let warning = command.hud.sys_warning != 0;

    values.insert("CF_Lkas_LdwsSysState".into(), command.hud.sys_state as f64);
    values.insert("CF_Lkas_SysWarning".into(), command.hud.sys_warning as f64);
    values.insert("CF_Lkas_LdwsLHWarning".into(), command.hud.left_lane_warning as f64);
    values.insert("CF_Lkas_LdwsRHWarning".into(), command.hud.right_lane_warning as f64);
    values.insert("CR_Lkas_StrToqReq".into(), command.apply_steer);
    values.insert("CF_Lkas_ActToi".into(), flag(command.steer_req));
    values.insert("CF_Lkas_ToiFlt".into(), 0.0);
    values.insert("CF_Lkas_MsgCount".into(), command.counter as f64);
    values.insert("CF_Lkas_Chksum".into(), 0.0);

    match model {
        CarModel::Sonata | CarModel::SonataHybrid | CarModel::Palisade => {
            values.insert("CF_Lkas_Bca_R".into(), lane_bits);
            values.insert("CF_Lkas_LdwsOpt_USM".into(), 2.0);
            values.insert(
                "CF_Lkas_FcwOpt_USM".into(),
                if command.enabled { 2.0 } else { 1.0 },
            );
            values.insert("CF_Lkas_SysWarning".into(), if warning { 4.0 } else { 0.0 });
        }
        CarModel::HyundaiGenesis => {
            // the cluster draws the lanes itself; keep the camera's warning
            values.insert("CF_Lkas_Bca_R".into(), lane_bits);
            values.insert("CF_Lkas_SysWarning".into(), camera_warning);
        }
        CarModel::KiaNiroEv => {
            values.insert("CF_Lkas_LdwsOpt_USM".into(), 3.0);
        }
        _ => {}
    }

    OutgoingMessage::new(bus, LKAS11, values)
}

/// Cluster frame with a patched button state and display speed
pub fn create_clu11(
    frame: u64,
    bus: Bus,
    clu11: &MessageValues,
    button: Button,
    speed: f64,
) -> OutgoingMessage {
    let mut values = clu11.clone();
    values.insert("CF_Clu_CruiseSwState".into(), button.code());
    values.insert("CF_Clu_Vanz".into(), speed);
    values.insert("CF_Clu_AliveCnt1".into(), (frame % 0x10) as f64);
    OutgoingMessage::new(bus, CLU11, values)
}

/// Assist controller status echoed to the camera so it does not fault
pub fn create_mdps12(frame: u64, mdps12: &MessageValues) -> OutgoingMessage {
    let mut values = mdps12.clone();
    values.insert("CF_Mdps_ToiActive".into(), 0.0);
    values.insert("CF_Mdps_ToiUnavail".into(), 1.0);
    values.insert("CF_Mdps_MsgCount2".into(), (frame % 0x100) as f64);
    values.insert("CF_Mdps_Chksum2".into(), 0.0);
    OutgoingMessage::new(Bus::Camera, MDPS12, values)
}

/// Cruise acceleration command
pub fn create_scc12(
    apply_accel: f64,
    enabled: bool,
    counter: u8,
    scc12: &MessageValues,
) -> OutgoingMessage {
    let mut values = scc12.clone();
    let accel = if enabled { apply_accel } else { 0.0 };
    values.insert("aReqRaw".into(), accel);
    values.insert("aReqValue".into(), accel);
    values.insert("CR_VSM_Alive".into(), counter as f64);
    values.insert("CR_VSM_ChkSum".into(), 0.0);
    OutgoingMessage::new(Bus::Default, SCC12, values)
}

/// Lane following assist HUD indicator
pub fn create_lfa_mfa(enabled: bool) -> OutgoingMessage {
    let mut values = MessageValues::new();
    values.insert("ACTIVE".into(), flag(enabled));
    values.insert("HDA_USM".into(), 2.0);
    OutgoingMessage::new(Bus::Default, LFAHDA_MFC, values)
}
