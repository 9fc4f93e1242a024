//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them — log to serial, publish upstream, etc.

use crate::control::fan::FanState;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The application service has started (carries initial state).
    Started(FanState),

    /// The fan output changed, with the reading that caused it.
    /// `temp_c` is `None` when the change came from the elapsed-time check.
    FanChanged { on: bool, temp_c: Option<f32> },

    /// A valid nozzle temperature was extracted from a status message.
    ReadingAccepted { temp_c: f32 },

    /// A status message could not be decoded and was dropped.
    PayloadDropped,

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone)]
pub struct TelemetryData {
    pub state: FanState,
    pub fan_on: bool,
    pub last_temp_c: Option<f32>,
    pub messages_accepted: u64,
    pub messages_dropped: u64,
}
