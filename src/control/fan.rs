//! Fan hold-off state machine — the core of the firmware.
//!
//! Decides when to turn the cooling fan on and, more importantly, when to
//! turn it off: only after `fan_off_delay_ms` has elapsed since the most
//! recent at/above-threshold reading. The delay is a sliding window — every
//! qualifying reading re-arms it — which prevents rapid on/off cycling
//! around the threshold.
//!
//! ```text
//!          ┌──[reading ≥ threshold]──────────────────┐
//!          │                                          │
//!   OFF ───┴─[reading ≥ threshold]──▶ ON_ACTIVE ◀─────┤
//!    ▲                                    │           │
//!    │                         [reading < threshold]  │
//!    │                                    ▼           │
//!    └──[hold-off elapsed]─────────── ON_COOLING ─────┘
//! ```
//!
//! The machine is pure: it never touches hardware. Callers apply the
//! returned [`FanTransition`] to the actuator port. Every `f32` input is
//! handled — NaN cannot satisfy `>= threshold` and is treated as a
//! below-threshold reading; there is no error state.

use log::info;

use crate::config::SystemConfig;

/// Fan controller states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanState {
    /// Fan off, no hold-off pending.
    Off,
    /// Fan on; last reading was at/above threshold.
    OnActive,
    /// Fan on; temperature has dropped below threshold but the hold-off
    /// window has not yet elapsed.
    OnCooling,
}

/// Actuator side effect requested by a state change.
///
/// Emitted at most once per edge — repeated qualifying readings while
/// already on produce no redundant `TurnOn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanTransition {
    TurnOn,
    TurnOff,
}

/// The hold-off state machine.
pub struct FanController {
    state: FanState,
    /// Last moment a reading at or above threshold was observed.
    /// `None` when the fan is off.
    last_above_threshold_ms: Option<u64>,
    threshold_c: f32,
    fan_off_delay_ms: u64,
}

impl FanController {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            state: FanState::Off,
            last_above_threshold_ms: None,
            threshold_c: config.threshold_c,
            fan_off_delay_ms: config.fan_off_delay_ms,
        }
    }

    /// Feed one temperature reading into the machine.
    ///
    /// `now_ms` is monotonic milliseconds since boot. Returns the actuator
    /// transition to apply, if the fan output should change.
    pub fn on_reading(&mut self, temp_c: f32, now_ms: u64) -> Option<FanTransition> {
        // Inclusive boundary: exactly-at-threshold counts as hot.
        if temp_c >= self.threshold_c {
            // Sliding window — every qualifying reading re-arms the timer.
            self.last_above_threshold_ms = Some(now_ms);
            match self.state {
                FanState::Off => {
                    self.transition(FanState::OnActive);
                    Some(FanTransition::TurnOn)
                }
                FanState::OnCooling => {
                    // Fan already on; no actuator edge.
                    self.transition(FanState::OnActive);
                    None
                }
                FanState::OnActive => None,
            }
        } else {
            match self.state {
                FanState::Off => None,
                FanState::OnActive => {
                    self.transition(FanState::OnCooling);
                    self.check_hold_off(now_ms)
                }
                FanState::OnCooling => self.check_hold_off(now_ms),
            }
        }
    }

    /// Re-evaluate the off transition against elapsed time alone.
    ///
    /// Called on every control tick so the fan cannot stay on indefinitely
    /// when the printer stops publishing after temperature has dropped.
    pub fn on_elapsed(&mut self, now_ms: u64) -> Option<FanTransition> {
        match self.state {
            FanState::Off => None,
            FanState::OnActive | FanState::OnCooling => self.check_hold_off(now_ms),
        }
    }

    /// Whether the actuator output is currently asserted.
    pub fn is_on(&self) -> bool {
        self.state != FanState::Off
    }

    /// Current state.
    pub fn state(&self) -> FanState {
        self.state
    }

    /// Timestamp of the most recent at/above-threshold reading.
    pub fn last_above_threshold_ms(&self) -> Option<u64> {
        self.last_above_threshold_ms
    }

    // ── Internal ──────────────────────────────────────────────

    /// Turn off if the hold-off window has fully elapsed.
    fn check_hold_off(&mut self, now_ms: u64) -> Option<FanTransition> {
        let last = self.last_above_threshold_ms?;
        if now_ms.saturating_sub(last) >= self.fan_off_delay_ms {
            self.last_above_threshold_ms = None;
            self.transition(FanState::Off);
            Some(FanTransition::TurnOff)
        } else {
            None
        }
    }

    fn transition(&mut self, next: FanState) {
        info!("fan: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
