//! Multi-cycle scenarios through the public `CarInterface` API

use hkg_car_interface::{
    ActuatorRequest, Bus, BusLocation, BusSnapshots, CarInterface, CarModel, CruiseBus,
    OutgoingMessage, SignalSnapshot, VehicleConfiguration,
};

const RESUME_CODE: f64 = 1.0;

fn is_resume(msg: &OutgoingMessage) -> bool {
    msg.name == "CLU11" && msg.signal("CF_Clu_CruiseSwState") == RESUME_CODE
}

/// Stopped car: all wheels at zero, lead distance reported on the default bus
fn standstill_buses(lead_distance: f64) -> BusSnapshots {
    BusSnapshots {
        default: SignalSnapshot::new()
            .with_signal("WHL_SPD11", "WHL_SPD_FL", 0.0)
            .with_signal("WHL_SPD11", "WHL_SPD_FR", 0.0)
            .with_signal("WHL_SPD11", "WHL_SPD_RL", 0.0)
            .with_signal("WHL_SPD11", "WHL_SPD_RR", 0.0)
            .with_signal("SCC11", "ACC_ObjDist", lead_distance)
            .with_signal("CLU11", "CF_Clu_Vanz", 0.0)
            .with_signal("CGW1", "CF_Gway_DrvSeatBeltSw", 1.0),
        secondary: SignalSnapshot::new().with_signal("MDPS12", "CR_Mdps_StrColTq", 0.0),
        camera: SignalSnapshot::new()
            .with_signal("LKAS11", "CF_Lkas_MsgCount", 6.0)
            .with_signal("LKAS11", "CF_Lkas_LdwsSysState", 1.0),
    }
}

fn no_radar_relocated_mdps() -> VehicleConfiguration {
    VehicleConfiguration::new(CarModel::Kona)
        .with_mdps_bus(BusLocation::Secondary)
        .with_scc_bus(CruiseBus::NoRadar)
}

#[test]
fn test_resume_pulses_after_lead_moves() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut interface = CarInterface::new(no_radar_relocated_mdps()).unwrap();
    let request = ActuatorRequest::default();

    let mut pulse_cycles = Vec::new();
    for cycle in 0..20u64 {
        let lead_distance = if cycle < 5 { 20.0 } else { 20.0 + (cycle - 4) as f64 };
        let output = interface.step(&standstill_buses(lead_distance), cycle, &request);
        assert!(output.state.standstill);

        let pulses: Vec<&OutgoingMessage> = output.messages.iter().filter(|m| is_resume(m)).collect();
        assert!(pulses.len() <= 1, "cycle {} sent {} presses", cycle, pulses.len());
        if let Some(press) = pulses.first() {
            // no radar: buttons go out on the default bus
            assert_eq!(press.bus, Bus::Default);
            pulse_cycles.push(cycle);
        }
    }

    assert!(pulse_cycles.iter().all(|&c| c >= 5), "pulse before lead moved");
    assert_eq!(&pulse_cycles[..6], &[5, 6, 7, 8, 9, 10]);
    // forced pause after the sixth press
    for idle in 11..=15 {
        assert!(!pulse_cycles.contains(&idle), "pulse during pause at {}", idle);
    }
    assert_eq!(pulse_cycles[6], 16);
    assert_eq!(interface.controller().resume_presses(), pulse_cycles.len() as u64);
}

#[test]
fn test_relocated_mdps_message_order() {
    let mut interface = CarInterface::new(no_radar_relocated_mdps()).unwrap();
    let output = interface.step(&standstill_buses(20.0), 0, &ActuatorRequest::default());

    let order: Vec<(&str, Bus)> = output
        .messages
        .iter()
        .map(|m| (m.name.as_str(), m.bus))
        .collect();
    assert_eq!(
        order,
        vec![
            ("LKAS11", Bus::Default),
            ("LKAS11", Bus::Secondary),
            ("CLU11", Bus::Secondary),
            ("MDPS12", Bus::Camera),
        ]
    );
}

#[test]
fn test_lkas11_counter_sequence_across_cycles() {
    let mut interface = CarInterface::new(no_radar_relocated_mdps()).unwrap();
    let request = ActuatorRequest::default();

    let counts: Vec<f64> = (0..12u64)
        .map(|cycle| {
            let output = interface.step(&standstill_buses(20.0), cycle, &request);
            let primary = &output.messages[0];
            let duplicate = &output.messages[1];
            assert_eq!(primary.signal("CF_Lkas_MsgCount"), duplicate.signal("CF_Lkas_MsgCount"));
            primary.signal("CF_Lkas_MsgCount")
        })
        .collect();

    // camera last sent 6
    let expected: Vec<f64> = (7..19).map(|n| (n % 16) as f64).collect();
    assert_eq!(counts, expected);
}

#[test]
fn test_scc12_counter_only_advances_when_sent() {
    let config = VehicleConfiguration::new(CarModel::Sonata)
        .with_scc_bus(CruiseBus::Camera)
        .with_longitudinal_control(true);
    let mut interface = CarInterface::new(config).unwrap();

    let mut buses = standstill_buses(20.0);
    buses.camera.set("SCC12", "CR_VSM_Alive", 11.0);
    let request = ActuatorRequest {
        enabled: true,
        gas: 0.4,
        ..ActuatorRequest::default()
    };

    let mut counters = Vec::new();
    for cycle in 0..10u64 {
        let output = interface.step(&buses, cycle, &request);
        let scc12: Vec<&OutgoingMessage> = output.messages.iter().filter(|m| m.name == "SCC12").collect();
        if cycle % 2 == 0 {
            assert_eq!(scc12.len(), 1);
            let accel = scc12[0].signal("aReqValue");
            assert!((-3.0..=1.5).contains(&accel));
            counters.push(scc12[0].signal("CR_VSM_Alive"));
        } else {
            assert!(scc12.is_empty());
        }
    }
    assert_eq!(counters, vec![12.0, 13.0, 14.0, 0.0, 1.0]);
}

#[test]
fn test_steering_limits_hold_over_a_drive() {
    let config = VehicleConfiguration::new(CarModel::Elantra);
    let mut interface = CarInterface::new(config).unwrap();

    let moving = BusSnapshots {
        default: SignalSnapshot::new()
            .with_signal("WHL_SPD11", "WHL_SPD_FL", 60.0)
            .with_signal("WHL_SPD11", "WHL_SPD_FR", 60.0)
            .with_signal("WHL_SPD11", "WHL_SPD_RL", 60.0)
            .with_signal("WHL_SPD11", "WHL_SPD_RR", 60.0),
        ..BusSnapshots::default()
    };

    let mut last = 0.0;
    for cycle in 0..300u64 {
        let steer = if (cycle / 50) % 2 == 0 { 1.0 } else { -1.0 };
        let request = ActuatorRequest {
            enabled: cycle < 250,
            steer,
            ..ActuatorRequest::default()
        };
        let output = interface.step(&moving, cycle, &request);
        let torque = output.messages[0].signal("CR_Lkas_StrToqReq");

        assert!(torque.abs() <= 255.0);
        if request.enabled {
            assert!((torque - last).abs() <= 7.0, "cycle {}: {} -> {}", cycle, last, torque);
        } else {
            assert_eq!(torque, 0.0);
        }
        last = torque;
    }
}
