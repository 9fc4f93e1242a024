//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! A future MQTT publish adapter would implement the same trait.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::FanChanged { on, temp_c } => match temp_c {
                Some(t) => info!("FAN   | {} (nozzle {:.1}\u{00b0}C)", on_off(*on), t),
                None => info!("FAN   | {} (hold-off elapsed)", on_off(*on)),
            },
            AppEvent::ReadingAccepted { temp_c } => {
                debug!("TEMP  | nozzle {:.1}\u{00b0}C", temp_c);
            }
            AppEvent::PayloadDropped => {
                warn!("DROP  | undecodable status payload");
            }
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | state={:?} | fan={} | nozzle={} | msgs={} dropped={}",
                    t.state,
                    on_off(t.fan_on),
                    t.last_temp_c
                        .map_or_else(|| "n/a".into(), |v| format!("{:.1}\u{00b0}C", v)),
                    t.messages_accepted,
                    t.messages_dropped,
                );
            }
        }
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "ON" } else { "OFF" }
}
