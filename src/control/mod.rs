//! Control logic — the fan hold-off state machine.

pub mod fan;
