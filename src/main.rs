//! Nozzle fan controller — main entry point.
//!
//! Hexagonal architecture with event-driven execution.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   NvsAdapter   Esp32Time       │
//! │  (ActuatorPort)    (EventSink)    (ConfigPort) (clock)         │
//! │  WifiAdapter       MqttAdapter                                 │
//! │  (Connectivity)    (telemetry transport)                       │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  payload decode · hold-off machine                     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
pub mod config;
mod events;
mod pins;
mod telemetry;

pub mod app;
mod adapters;
pub mod control;
mod drivers;

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{info, warn};

use adapters::hardware::HardwareAdapter;
use adapters::log_sink::LogEventSink;
use adapters::mqtt::MqttAdapter;
use adapters::nvs::NvsAdapter;
use adapters::time::Esp32TimeAdapter;
use adapters::wifi::{ConnectivityPort, WifiAdapter};
use app::events::AppEvent;
use app::ports::{ConfigPort, EventSink};
use app::service::AppService;
use config::SystemConfig;
use events::Event;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  NozzleFan v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config from NVS (or defaults) ─────────────────
    //
    // The configuration is immutable for the life of the process. A
    // provisioned blob wins; anything else falls back to defaults.
    let config = match NvsAdapter::new() {
        Ok(nvs) => match nvs.load() {
            Ok(cfg) => {
                info!("Config loaded from NVS");
                cfg
            }
            Err(e) => {
                warn!("NVS config load failed ({}), using defaults", e);
                SystemConfig::default()
            }
        },
        Err(e) => {
            warn!("NVS init failed ({}), using defaults", e);
            SystemConfig::default()
        }
    };

    // ── 3. Initialise hardware peripherals ────────────────────
    if let Err(e) = drivers::hw_init::init_peripherals(config.fan_gpio) {
        // Peripheral init failure is critical — log and halt.
        // In production this triggers the watchdog reset after timeout.
        log::error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }
    let watchdog = drivers::watchdog::Watchdog::subscribe();

    let time_adapter = Esp32TimeAdapter::new();

    // ── 4. Construct adapters ─────────────────────────────────
    let mut hw = HardwareAdapter::new(drivers::fan::FanDriver::new());
    let mut log_sink = LogEventSink::new();

    let mut wifi = match WifiAdapter::new(&config) {
        Ok(w) => w,
        Err(e) => {
            log::error!("WiFi credentials invalid: {} — halting", e);
            #[allow(clippy::empty_loop)]
            loop {}
        }
    };
    if wifi.connect(time_adapter.uptime_ms()).is_err() {
        warn!("WiFi: initial connect failed, retrying in the background");
    }

    let mut mqtt = MqttAdapter::new(&config);
    mqtt.start(time_adapter.uptime_ms());

    // ── 5. Construct app service ──────────────────────────────
    let mut app = AppService::new(&config);
    app.start(&mut hw, &mut log_sink);

    info!("System ready. Entering event loop.");

    // ── 6. Event loop ─────────────────────────────────────────
    let tick_ms = u64::from(config.control_tick_interval_ms);
    let telemetry_every = u64::from(config.telemetry_interval_secs) * 1000 / tick_ms.max(1);
    let mut telemetry_counter: u64 = 0;

    loop {
        // The control cadence is generated here rather than by a hardware
        // timer: the loop has nothing else to wake for between passes.
        // Ticks deliberately do not go through the event queue — the MQTT
        // task is its only producer.
        std::thread::sleep(std::time::Duration::from_millis(tick_ms));

        let now_ms = time_adapter.uptime_ms();
        wifi.poll(now_ms);
        mqtt.poll(now_ms);

        // Process everything the MQTT task queued since the last pass.
        events::drain_events(|event| {
            match event {
                Event::StatusMessage => {
                    // Drain the whole inbox; several reports may have
                    // landed since the last pass.
                    while let Some(msg) = mqtt.take_message() {
                        app.on_message(
                            &msg.topic,
                            &msg.payload,
                            time_adapter.uptime_ms(),
                            &mut hw,
                            &mut log_sink,
                        );
                    }
                }

                Event::ConnectivityChanged => {
                    info!(
                        "Broker connectivity: {}",
                        if mqtt.is_connected() { "up" } else { "down" }
                    );
                }
            }
        });

        // Periodic off-transition re-check, every pass.
        app.tick(time_adapter.uptime_ms(), &mut hw, &mut log_sink);

        telemetry_counter += 1;
        if telemetry_counter >= telemetry_every {
            telemetry_counter = 0;
            log_sink.emit(&AppEvent::Telemetry(app.build_telemetry()));
        }

        // Feed watchdog on every iteration.
        watchdog.feed();
    }
}
