//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements       | Connects to               |
//! |------------|------------------|---------------------------|
//! | `hardware` | ActuatorPort     | ESP32 LEDC PWM            |
//! | `log_sink` | EventSink        | Serial log output         |
//! | `nvs`      | ConfigPort       | NVS / defaults fallback   |
//! | `time`     | (monotonic time) | ESP32 system timer        |
//! | `wifi`     | ConnectivityPort | ESP-IDF WiFi STA          |
//! | `mqtt`     | (message source) | Printer's MQTT broker     |

pub mod hardware;
pub mod log_sink;
pub mod mqtt;
pub mod nvs;
pub mod time;
pub mod wifi;
