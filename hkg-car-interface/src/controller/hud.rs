//! HUD alert encoding for the lane keep status frame

use crate::models::CarModel;
use crate::types::VisualAlert;

/// Encoded HUD fields for one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HudAlert {
    /// Steering-required warning code, 0 when no warning
    pub sys_warning: u8,
    /// Lane visibility / system state code
    pub sys_state: u8,
    pub left_lane_warning: u8,
    pub right_lane_warning: u8,
}

/// Lane and alert inputs to the HUD encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HudInputs {
    /// Lane keep is actively steering
    pub lkas_active: bool,
    pub visual_alert: VisualAlert,
    pub left_lane: bool,
    pub right_lane: bool,
    pub left_lane_depart: bool,
    pub right_lane_depart: bool,
    /// Driver's LKAS button state as reported by the camera
    pub button_on: bool,
}

/// Encode the HUD fields
///
/// State codes: 0 LKAS off, 1 no lanes, 3 both lanes (active), 4 both lanes
/// (standby), 5 left lane only, 6 right lane only.
pub fn process_hud_alert(model: CarModel, inputs: &HudInputs) -> HudAlert {
    let genesis = model.is_genesis_family();

    let sys_warning = if inputs.visual_alert == VisualAlert::SteerRequired {
        if genesis {
            4
        } else {
            3
        }
    } else {
        0
    };
    let warning = sys_warning != 0;

    let sys_state = if (inputs.left_lane && inputs.right_lane) || warning {
        if inputs.lkas_active || warning {
            3
        } else {
            4
        }
    } else if inputs.left_lane {
        5
    } else if inputs.right_lane {
        6
    } else if inputs.button_on {
        1
    } else {
        0
    };

    let depart_code = if genesis { 1 } else { 2 };
    HudAlert {
        sys_warning,
        sys_state,
        left_lane_warning: if inputs.left_lane_depart { depart_code } else { 0 },
        right_lane_warning: if inputs.right_lane_depart { depart_code } else { 0 },
    }
}
