//! GPIO / peripheral pin assignments for the fan controller board.
//!
//! Single source of truth — drivers reference this module rather than
//! hard-coding pin numbers. The fan GPIO itself is also carried in
//! [`SystemConfig`](crate::config::SystemConfig) (it is a configuration
//! value per the wiring of any given build); the constant here is the
//! default for boards following the reference schematic.

/// LEDC PWM output driving the fan MOSFET gate.
pub const FAN_PWM_GPIO: i32 = 6;

/// LEDC base frequency for the fan (25 kHz — inaudible).
pub const FAN_PWM_FREQ_HZ: u32 = 25_000;
