//! Transport-to-core message flow: broker delivery → inbox → AppService.
//!
//! Uses the MQTT adapter's host backend with injected messages, so the
//! whole path short of the real socket is exercised.

use nozzlefan::adapters::mqtt::{MqttAdapter, MqttState};
use nozzlefan::app::service::AppService;
use nozzlefan::config::SystemConfig;

use crate::mock_hw::{MockFan, VecSink};

fn make_config() -> SystemConfig {
    let mut c = SystemConfig::default();
    c.mqtt_broker.push_str("10.0.0.42").unwrap();
    c.mqtt_password.push_str("12345678").unwrap();
    c
}

/// A realistic full status report — the temperature field sits among
/// dozens of siblings in the real payload.
const FULL_REPORT: &[u8] = br#"{
  "print": {
    "bed_temper": 55.0,
    "nozzle_temper": 218.5,
    "chamber_temper": 31.0,
    "mc_percent": 42,
    "mc_remaining_time": 118,
    "gcode_state": "RUNNING",
    "layer_num": 87
  }
}"#;

#[test]
fn broker_payload_drives_fan() {
    let config = make_config();
    let mut mqtt = MqttAdapter::new(&config);
    mqtt.start(0);
    mqtt.poll(0);
    assert_eq!(mqtt.state(), MqttState::Connected);

    let mut app = AppService::new(&config);
    let mut hw = MockFan::new();
    let mut sink = VecSink::new();
    app.start(&mut hw, &mut sink);

    mqtt.inject_message("device/01S00C123/report", FULL_REPORT);

    let msg = mqtt.take_message().unwrap();
    app.on_message(&msg.topic, &msg.payload, 1_000, &mut hw, &mut sink);

    // 218.5 °C is above the default 180 °C threshold.
    assert!(hw.fan_on());
    assert_eq!(app.build_telemetry().last_temp_c, Some(218.5));
}

#[test]
fn inbox_backlog_is_processed_in_arrival_order() {
    let config = make_config();
    let mut mqtt = MqttAdapter::new(&config);
    mqtt.start(0);
    mqtt.poll(0);

    // Several reports land between main-loop passes.
    mqtt.inject_message("device/x/report", br#"{"print":{"nozzle_temper":220.0}}"#);
    mqtt.inject_message("device/x/report", br#"{"print":{"nozzle_temper":150.0}}"#);
    mqtt.inject_message("device/x/report", br#"{"print":{"nozzle_temper":90.0}}"#);

    let mut app = AppService::new(&config);
    let mut hw = MockFan::new();
    let mut sink = VecSink::new();
    app.start(&mut hw, &mut sink);

    let mut now = 0;
    while let Some(msg) = mqtt.take_message() {
        now += 1_000;
        app.on_message(&msg.topic, &msg.payload, now, &mut hw, &mut sink);
    }

    // The last reading processed wins.
    assert_eq!(app.build_telemetry().last_temp_c, Some(90.0));
    assert_eq!(app.build_telemetry().messages_accepted, 3);
    // Fan went on at 220 and holds through the cool readings.
    assert!(hw.fan_on());
}

#[test]
fn garbage_from_broker_never_disturbs_control() {
    let config = make_config();
    let mut mqtt = MqttAdapter::new(&config);
    mqtt.start(0);
    mqtt.poll(0);

    let mut app = AppService::new(&config);
    let mut hw = MockFan::new();
    let mut sink = VecSink::new();
    app.start(&mut hw, &mut sink);

    mqtt.inject_message("device/x/report", FULL_REPORT);
    mqtt.inject_message("device/x/report", b"\xff\xfe binary junk \x00");
    mqtt.inject_message("device/x/report", br#"{"info":{"command":"get_version"}}"#);

    let mut now = 0;
    while let Some(msg) = mqtt.take_message() {
        now += 1_000;
        app.on_message(&msg.topic, &msg.payload, now, &mut hw, &mut sink);
    }

    let t = app.build_telemetry();
    assert_eq!(t.messages_accepted, 1);
    assert_eq!(t.messages_dropped, 2);
    assert!(hw.fan_on());
    assert_eq!(sink.count_dropped(), 2);
}

#[test]
fn reconnect_restores_the_subscription_and_flow() {
    let config = make_config();
    let mut mqtt = MqttAdapter::new(&config);
    mqtt.start(0);
    mqtt.poll(0);
    assert_eq!(mqtt.sim_subscribe_count(), 1);

    mqtt.sim_drop_connection();
    mqtt.poll(30_000);
    assert!(matches!(mqtt.state(), MqttState::Reconnecting { .. }));

    // Fixed 5s retry cadence until the simulated broker accepts again.
    let mut now = 30_000;
    while mqtt.state() != MqttState::Connected {
        now += 5_000;
        mqtt.poll(now);
        assert!(now < 120_000, "reconnect never completed");
    }
    assert_eq!(mqtt.sim_subscribe_count(), 2);

    // Delivery works again after the resubscribe.
    mqtt.inject_message("device/x/report", FULL_REPORT);
    assert!(mqtt.take_message().is_some());
}
