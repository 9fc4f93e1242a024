//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the fan controller and orchestrates the reactive
//! flow: status message → temperature extraction → hold-off machine →
//! actuator write. All I/O flows through port traits injected at call
//! sites, making the entire service testable with mock adapters.
//!
//! ```text
//!  (topic, payload) ──▶ ┌───────────────────────────┐ ──▶ EventSink
//!                       │        AppService          │
//!        ActuatorPort ◀──│  decode · FanController    │
//!                       └───────────────────────────┘
//! ```

use log::debug;

use crate::config::SystemConfig;
use crate::control::fan::{FanController, FanState, FanTransition};
use crate::telemetry;

use super::events::{AppEvent, TelemetryData};
use super::ports::{ActuatorPort, EventSink};

/// The application service orchestrates all domain logic.
pub struct AppService {
    controller: FanController,
    last_temp_c: Option<f32>,
    messages_accepted: u64,
    messages_dropped: u64,
}

impl AppService {
    /// Construct the service from configuration.
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            controller: FanController::new(config),
            last_temp_c: None,
            messages_accepted: 0,
            messages_dropped: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start with all outputs deasserted. State is never persisted — every
    /// boot begins from off.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        hw.all_off();
        sink.emit(&AppEvent::Started(self.controller.state()));
    }

    // ── Reactive entry points ─────────────────────────────────

    /// Handle one raw status message from the transport.
    ///
    /// Undecodable payloads are counted and dropped; the controller state
    /// is left completely untouched by them.
    pub fn on_message(
        &mut self,
        topic: &str,
        payload: &[u8],
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        debug!("message arrived [{}] ({} bytes)", topic, payload.len());

        let Some(temp_c) = telemetry::try_extract_nozzle_temperature(payload) else {
            self.messages_dropped += 1;
            sink.emit(&AppEvent::PayloadDropped);
            return;
        };

        self.messages_accepted += 1;
        self.last_temp_c = Some(temp_c);
        sink.emit(&AppEvent::ReadingAccepted { temp_c });

        if let Some(t) = self.controller.on_reading(temp_c, now_ms) {
            self.apply(t, Some(temp_c), hw, sink);
        }
    }

    /// Periodic control tick: re-run the off-transition check so the fan
    /// cannot stay on forever when the printer goes quiet mid-cool-down.
    pub fn tick(&mut self, now_ms: u64, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        if let Some(t) = self.controller.on_elapsed(now_ms) {
            self.apply(t, None, hw, sink);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot from the current state.
    pub fn build_telemetry(&self) -> TelemetryData {
        TelemetryData {
            state: self.controller.state(),
            fan_on: self.controller.is_on(),
            last_temp_c: self.last_temp_c,
            messages_accepted: self.messages_accepted,
            messages_dropped: self.messages_dropped,
        }
    }

    /// Current controller state.
    pub fn state(&self) -> FanState {
        self.controller.state()
    }

    /// Whether the fan output is asserted.
    pub fn fan_on(&self) -> bool {
        self.controller.is_on()
    }

    // ── Internal ──────────────────────────────────────────────

    /// Translate a controller transition into the actuator write.
    fn apply(
        &mut self,
        transition: FanTransition,
        temp_c: Option<f32>,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        let on = matches!(transition, FanTransition::TurnOn);
        hw.set_fan(on);
        sink.emit(&AppEvent::FanChanged { on, temp_c });
    }
}
