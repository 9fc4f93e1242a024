//! Fuzz target: `try_extract_nozzle_temperature`
//!
//! Drives arbitrary byte sequences through the status payload decoder and
//! asserts that it never panics and only ever yields real `f32` values —
//! the no-error-state contract of the control core depends on it.
//!
//! cargo fuzz run fuzz_payload_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use nozzlefan::telemetry::try_extract_nozzle_temperature;

fuzz_target!(|data: &[u8]| {
    if let Some(temp) = try_extract_nozzle_temperature(data) {
        // JSON cannot encode NaN; a Some result may overflow to infinity on
        // absurd exponents but must never be NaN.
        assert!(!temp.is_nan(), "decoder yielded NaN temperature");
    }
});
