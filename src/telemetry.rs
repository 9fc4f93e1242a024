//! Printer telemetry decoding.
//!
//! Bambu Lab printers publish a large JSON report on `device/<serial>/report`
//! every few seconds. The only field this firmware cares about is the nozzle
//! temperature, nested under the top-level `print` object:
//!
//! ```json
//! { "print": { "nozzle_temper": 211.5, ... }, ... }
//! ```
//!
//! Decoding is intentionally total: any parse error, missing field, or
//! wrong-typed value yields `None` — logged and dropped, never an error the
//! caller has to handle. The fan controller is only ever invoked with a
//! valid numeric reading.

use log::{debug, warn};

/// Extract the nozzle temperature from a raw status payload.
///
/// Returns `None` for malformed JSON, a missing `print.nozzle_temper`
/// field, or a non-numeric value. All other fields are ignored.
pub fn try_extract_nozzle_temperature(payload: &[u8]) -> Option<f32> {
    let doc: serde_json::Value = match serde_json::from_slice(payload) {
        Ok(v) => v,
        Err(e) => {
            warn!("telemetry: JSON decode failed: {}", e);
            return None;
        }
    };

    let Some(print) = doc.get("print") else {
        // Messages without a print section (e.g. mc_print pushes, info
        // replies) are routine — log quietly and move on.
        debug!("telemetry: no 'print' section, ignoring message");
        return None;
    };

    match print.get("nozzle_temper").and_then(serde_json::Value::as_f64) {
        Some(t) => Some(t as f32),
        None => {
            debug!("telemetry: 'nozzle_temper' missing or non-numeric");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_temperature_from_report() {
        let payload = br#"{"print":{"nozzle_temper":211.5,"bed_temper":60.0,"gcode_state":"RUNNING"}}"#;
        assert_eq!(try_extract_nozzle_temperature(payload), Some(211.5));
    }

    #[test]
    fn integer_temperature_is_accepted() {
        let payload = br#"{"print":{"nozzle_temper":180}}"#;
        assert_eq!(try_extract_nozzle_temperature(payload), Some(180.0));
    }

    #[test]
    fn missing_print_section_yields_none() {
        let payload = br#"{"info":{"command":"get_version"}}"#;
        assert_eq!(try_extract_nozzle_temperature(payload), None);
    }

    #[test]
    fn missing_field_yields_none() {
        let payload = br#"{"print":{"bed_temper":60.0}}"#;
        assert_eq!(try_extract_nozzle_temperature(payload), None);
    }

    #[test]
    fn non_numeric_field_yields_none() {
        let payload = br#"{"print":{"nozzle_temper":"hot"}}"#;
        assert_eq!(try_extract_nozzle_temperature(payload), None);
    }

    #[test]
    fn malformed_json_yields_none() {
        assert_eq!(try_extract_nozzle_temperature(b"{\"print\":"), None);
        assert_eq!(try_extract_nozzle_temperature(b""), None);
        assert_eq!(try_extract_nozzle_temperature(&[0xff, 0xfe, 0x00]), None);
    }

    #[test]
    fn non_object_root_yields_none() {
        assert_eq!(try_extract_nozzle_temperature(b"42"), None);
        assert_eq!(try_extract_nozzle_temperature(b"[1,2,3]"), None);
    }
}
