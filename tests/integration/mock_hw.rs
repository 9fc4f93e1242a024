//! Mock hardware adapter for integration tests.
//!
//! Records every actuator call so tests can assert on the full command
//! history without touching real GPIO/PWM registers.

use nozzlefan::app::events::AppEvent;
use nozzlefan::app::ports::{ActuatorPort, EventSink};

// ── MockFan ───────────────────────────────────────────────────

/// Actuator mock recording every `set_fan` write in order.
pub struct MockFan {
    pub writes: Vec<bool>,
}

#[allow(dead_code)]
impl MockFan {
    pub fn new() -> Self {
        Self { writes: Vec::new() }
    }

    /// The most recent commanded state (off if nothing was written).
    pub fn fan_on(&self) -> bool {
        self.writes.last().copied().unwrap_or(false)
    }

    /// Number of actuator writes issued so far.
    pub fn write_count(&self) -> usize {
        self.writes.len()
    }
}

impl Default for MockFan {
    fn default() -> Self {
        Self::new()
    }
}

impl ActuatorPort for MockFan {
    fn set_fan(&mut self, on: bool) {
        self.writes.push(on);
    }

    fn is_fan_on(&self) -> bool {
        self.fan_on()
    }

    fn all_off(&mut self) {
        self.writes.push(false);
    }
}

// ── VecSink ───────────────────────────────────────────────────

/// Event sink collecting every emitted [`AppEvent`].
pub struct VecSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl VecSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count_fan_changes(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::FanChanged { .. }))
            .count()
    }

    pub fn count_dropped(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::PayloadDropped))
            .count()
    }
}

impl Default for VecSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for VecSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
