//! System configuration parameters
//!
//! Everything tunable about the fan controller lives in [`SystemConfig`].
//! The record is loaded once at startup (NVS blob, falling back to the
//! built-in defaults) and is immutable for the lifetime of the process —
//! it is passed by reference into the controller and the transport
//! adapters, never accessed as ambient global state.

use serde::{Deserialize, Serialize};

use crate::pins;

/// Core system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- WiFi ---
    /// Station-mode SSID.
    pub wifi_ssid: heapless::String<32>,
    /// Station-mode password (empty for an open network).
    pub wifi_password: heapless::String<64>,

    // --- MQTT broker (the printer itself) ---
    /// Broker host — the printer's LAN IP address.
    pub mqtt_broker: heapless::String<64>,
    /// Broker port (8883 — the printer only speaks MQTT over TLS).
    pub mqtt_port: u16,
    /// Broker username (fixed `bblp` on Bambu Lab printers).
    pub mqtt_username: heapless::String<32>,
    /// Broker password — the LAN access code from the printer's screen.
    pub mqtt_password: heapless::String<64>,
    /// Wildcard subscription capturing all device status messages.
    pub status_topic: heapless::String<32>,

    // --- Fan control ---
    /// GPIO driving the fan MOSFET (PWM-capable).
    pub fan_gpio: i32,
    /// Trigger temperature (°C). Readings at or above turn the fan on.
    pub threshold_c: f32,
    /// Minimum time the fan stays on after the last at/above-threshold
    /// reading (milliseconds).
    pub fan_off_delay_ms: u64,

    // --- Timing ---
    /// Broker reconnect interval (seconds, fixed — no backoff).
    pub reconnect_interval_secs: u16,
    /// Control tick interval (milliseconds) — drives the periodic
    /// off-transition re-check when the printer goes quiet.
    pub control_tick_interval_ms: u32,
    /// Telemetry report interval (seconds).
    pub telemetry_interval_secs: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // WiFi — placeholders; real credentials come from the NVS blob.
            wifi_ssid: heapless::String::new(),
            wifi_password: heapless::String::new(),

            // MQTT
            mqtt_broker: heapless::String::new(),
            mqtt_port: 8883,
            mqtt_username: str_lit("bblp"),
            mqtt_password: heapless::String::new(),
            status_topic: str_lit("device/#"),

            // Fan control — 180 °C triggers for any filament type.
            fan_gpio: pins::FAN_PWM_GPIO,
            threshold_c: 180.0,
            fan_off_delay_ms: 300_000, // 5 minutes

            // Timing
            reconnect_interval_secs: 5,
            control_tick_interval_ms: 1000, // 1 Hz
            telemetry_interval_secs: 60,    // 1/min
        }
    }
}

/// Build a heapless string from a literal that is known to fit.
fn str_lit<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    let _ = out.push_str(s);
    out
}
