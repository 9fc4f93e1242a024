//! End-to-end fan control: raw JSON status payloads in, actuator writes out.
//!
//! These drive [`AppService`] exactly the way the main loop does — one
//! `on_message` per arriving report, one `tick` per control interval.

use nozzlefan::app::service::AppService;
use nozzlefan::config::SystemConfig;
use nozzlefan::control::fan::FanState;

use crate::mock_hw::{MockFan, VecSink};

const TOPIC: &str = "device/01S00C123456789/report";

fn report(temp: f32) -> Vec<u8> {
    format!(r#"{{"print":{{"nozzle_temper":{:.1},"bed_temper":55.0}}}}"#, temp).into_bytes()
}

struct Harness {
    app: AppService,
    hw: MockFan,
    sink: VecSink,
}

impl Harness {
    /// 200 °C threshold, 5-minute hold-off.
    fn new() -> Self {
        let mut config = SystemConfig::default();
        config.threshold_c = 200.0;
        config.fan_off_delay_ms = 300_000;
        let mut h = Self {
            app: AppService::new(&config),
            hw: MockFan::new(),
            sink: VecSink::new(),
        };
        h.app.start(&mut h.hw, &mut h.sink);
        h
    }

    fn message(&mut self, temp: f32, now_ms: u64) {
        self.app
            .on_message(TOPIC, &report(temp), now_ms, &mut self.hw, &mut self.sink);
    }

    fn tick(&mut self, now_ms: u64) {
        self.app.tick(now_ms, &mut self.hw, &mut self.sink);
    }
}

#[test]
fn startup_deasserts_fan() {
    let h = Harness::new();
    assert_eq!(h.hw.writes, vec![false]);
    assert_eq!(h.app.state(), FanState::Off);
}

#[test]
fn hot_reading_turns_fan_on_exactly_once() {
    let mut h = Harness::new();
    h.message(210.0, 0);
    assert!(h.hw.fan_on());
    assert_eq!(h.app.state(), FanState::OnActive);

    // Continued hot readings must not re-write the actuator.
    let writes = h.hw.write_count();
    h.message(215.0, 5_000);
    h.message(220.0, 10_000);
    assert_eq!(h.hw.write_count(), writes);
}

#[test]
fn threshold_is_inclusive() {
    let mut h = Harness::new();
    h.message(199.9, 0);
    assert!(!h.hw.fan_on());
    h.message(200.0, 5_000);
    assert!(h.hw.fan_on());
}

#[test]
fn cool_down_holds_fan_for_full_delay() {
    let mut h = Harness::new();
    h.message(210.0, 0);

    // Below threshold just before the window closes: fan stays on.
    h.message(150.0, 100_000);
    assert!(h.hw.fan_on());
    h.message(150.0, 299_999);
    assert!(h.hw.fan_on());
    assert_eq!(h.app.state(), FanState::OnCooling);

    // Past the window: fan goes off.
    h.message(150.0, 300_001);
    assert!(!h.hw.fan_on());
    assert_eq!(h.app.state(), FanState::Off);
}

#[test]
fn hold_off_boundary_is_inclusive() {
    let mut h = Harness::new();
    h.message(210.0, 0);
    h.message(150.0, 300_000);
    assert!(!h.hw.fan_on());
}

#[test]
fn reheat_during_cool_down_slides_the_window() {
    let mut h = Harness::new();
    h.message(210.0, 0);
    h.message(150.0, 100_000);
    assert_eq!(h.app.state(), FanState::OnCooling);

    // Hot again at t=250s: the window now runs from there.
    h.message(205.0, 250_000);
    assert_eq!(h.app.state(), FanState::OnActive);

    // Old deadline passes with nothing happening.
    h.message(150.0, 400_000);
    assert!(h.hw.fan_on());

    // New deadline (250s + 300s) closes it.
    h.message(150.0, 550_000);
    assert!(!h.hw.fan_on());
}

#[test]
fn tick_covers_printer_silence() {
    let mut h = Harness::new();
    h.message(210.0, 0);
    h.message(150.0, 60_000);

    // Printer goes quiet; only ticks arrive.
    for t in (61..=299u64).map(|s| s * 1_000) {
        h.tick(t);
        assert!(h.hw.fan_on(), "fan dropped early at t={}ms", t);
    }
    h.tick(300_000);
    assert!(!h.hw.fan_on());
}

#[test]
fn tick_turns_fan_off_even_without_any_cool_reading() {
    // The printer can die mid-print: last reading hot, then silence.
    let mut h = Harness::new();
    h.message(250.0, 0);
    assert_eq!(h.app.state(), FanState::OnActive);

    h.tick(299_999);
    assert!(h.hw.fan_on());
    h.tick(300_000);
    assert!(!h.hw.fan_on());
    assert_eq!(h.app.state(), FanState::Off);
}

#[test]
fn full_print_cycle() {
    let mut h = Harness::new();
    let mut now = 0u64;

    // Idle chatter before the print.
    for _ in 0..5 {
        h.message(25.0, now);
        now += 2_000;
    }
    assert!(!h.hw.fan_on());

    // Print runs hot for a while.
    for _ in 0..100 {
        h.message(220.0, now);
        now += 2_000;
    }
    assert!(h.hw.fan_on());

    // Print ends; nozzle cools.
    let cool_start = now;
    while now < cool_start + 400_000 {
        h.message(40.0, now);
        now += 2_000;
    }
    assert!(!h.hw.fan_on());
    assert_eq!(h.app.state(), FanState::Off);

    // Exactly one on and one off write after the initial deassert.
    assert_eq!(h.hw.writes, vec![false, true, false]);
}

#[test]
fn non_numeric_reading_never_extends_the_window() {
    let mut h = Harness::new();
    h.message(210.0, 0);
    h.app.on_message(
        TOPIC,
        br#"{"print":{"nozzle_temper":null}}"#,
        100_000,
        &mut h.hw,
        &mut h.sink,
    );
    h.tick(300_000);
    assert!(!h.hw.fan_on());
}

#[test]
fn telemetry_counts_accepted_and_dropped() {
    let mut h = Harness::new();
    h.message(210.0, 0);
    h.app
        .on_message(TOPIC, b"garbage", 1_000, &mut h.hw, &mut h.sink);
    h.message(150.0, 2_000);

    let t = h.app.build_telemetry();
    assert_eq!(t.messages_accepted, 2);
    assert_eq!(t.messages_dropped, 1);
    assert_eq!(t.last_temp_c, Some(150.0));
    assert!(t.fan_on);
    assert_eq!(h.sink.count_dropped(), 1);
}
