//! Application core — pure domain logic, zero I/O.
//!
//! Message decoding and the fan hold-off machine live below this layer;
//! here they are orchestrated behind **port traits** defined in [`ports`],
//! keeping everything testable without real peripherals or a network stack.

pub mod events;
pub mod ports;
pub mod service;
