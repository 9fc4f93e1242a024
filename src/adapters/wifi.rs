//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`] — the hexagonal boundary for network
//! connectivity.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## Reconnection policy
//!
//! On disconnect the adapter retries on a fixed interval
//! (`reconnect_interval_secs`, no backoff) for as long as the process runs.

use core::fmt;
use log::{error, info, warn};

use crate::config::SystemConfig;

// ───────────────────────────────────────────────────────────────
// Port trait
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
        }
    }
}

pub trait ConnectivityPort {
    fn connect(&mut self, now_ms: u64) -> Result<(), ConnectivityError>;
    fn is_connected(&self) -> bool;
    /// Drive the fixed-interval reconnect loop. Call every main-loop pass.
    fn poll(&mut self, now_ms: u64);
}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connected,
    Reconnecting { attempt: u32 },
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_credentials(ssid: &str, password: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() {
        return Err(ConnectivityError::NoCredentials);
    }
    if ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    if !password.is_empty() && (password.len() < 8 || password.len() > 64) {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    retry_interval_ms: u64,
    last_attempt_ms: u64,
    /// Simulation: counts platform_connect() calls for deterministic failures.
    #[cfg(not(target_os = "espidf"))]
    sim_connect_counter: u32,
}

impl WifiAdapter {
    /// Build the adapter from the immutable startup configuration.
    /// Credentials are validated here, before any radio activity.
    pub fn new(config: &SystemConfig) -> Result<Self, ConnectivityError> {
        validate_credentials(&config.wifi_ssid, &config.wifi_password)?;
        Ok(Self {
            state: WifiState::Disconnected,
            ssid: config.wifi_ssid.clone(),
            password: config.wifi_password.clone(),
            retry_interval_ms: u64::from(config.reconnect_interval_secs) * 1000,
            last_attempt_ms: 0,
            #[cfg(not(target_os = "espidf"))]
            sim_connect_counter: 0,
        })
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        // Blocking STA association via the esp-idf-svc wrapper. The modem
        // peripheral and sysloop are owned by the singleton below so the
        // adapter itself stays Send-free and testable.
        espidf_impl::connect(self.ssid.as_str(), self.password.as_str())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        self.sim_connect_counter = self.sim_connect_counter.wrapping_add(1);
        // Every 10th attempt fails, exercising the fixed-interval retry.
        if self.sim_connect_counter % 10 == 3 {
            warn!("WiFi(sim): simulated failure (attempt {})", self.sim_connect_counter);
            return Err(ConnectivityError::ConnectionFailed);
        }
        let auth = if self.password.is_empty() { "open" } else { "wpa2" };
        info!(
            "WiFi(sim): connected to '{}' ({}, attempt {})",
            self.ssid, auth, self.sim_connect_counter
        );
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        espidf_impl::is_connected()
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.state == WifiState::Connected
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn connect(&mut self, now_ms: u64) -> Result<(), ConnectivityError> {
        info!("WiFi: connecting to '{}'", self.ssid);
        self.last_attempt_ms = now_ms;

        match self.platform_connect() {
            Ok(()) => {
                self.state = WifiState::Connected;
                info!("WiFi: connected");
                Ok(())
            }
            Err(e) => {
                error!("WiFi: connection failed — {}", e);
                self.state = WifiState::Reconnecting { attempt: 0 };
                Err(e)
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.platform_is_connected()
    }

    fn poll(&mut self, now_ms: u64) {
        match self.state {
            WifiState::Reconnecting { attempt } => {
                if now_ms.saturating_sub(self.last_attempt_ms) < self.retry_interval_ms {
                    return;
                }
                self.last_attempt_ms = now_ms;
                info!("WiFi: reconnect attempt {}", attempt + 1);
                match self.platform_connect() {
                    Ok(()) => {
                        self.state = WifiState::Connected;
                        info!("WiFi: reconnected");
                    }
                    Err(_) => {
                        self.state = WifiState::Reconnecting { attempt: attempt + 1 };
                    }
                }
            }
            WifiState::Connected => {
                if !self.platform_is_connected() {
                    warn!("WiFi: connection lost, entering reconnect");
                    self.state = WifiState::Reconnecting { attempt: 0 };
                }
            }
            WifiState::Disconnected => {}
        }
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF backend
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod espidf_impl {
    use super::ConnectivityError;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::hal::modem::Modem;
    use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
    use std::sync::Mutex;

    static WIFI: Mutex<Option<BlockingWifi<EspWifi<'static>>>> = Mutex::new(None);

    pub fn connect(ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        let mut guard = WIFI.lock().expect("wifi mutex poisoned");

        if guard.is_none() {
            // SAFETY: the modem peripheral is taken exactly once, on the
            // first connect call from the main task.
            let modem = unsafe { Modem::new() };
            let sysloop =
                EspSystemEventLoop::take().map_err(|_| ConnectivityError::ConnectionFailed)?;
            let esp_wifi = EspWifi::new(modem, sysloop.clone(), None)
                .map_err(|_| ConnectivityError::ConnectionFailed)?;
            let wifi = BlockingWifi::wrap(esp_wifi, sysloop)
                .map_err(|_| ConnectivityError::ConnectionFailed)?;
            *guard = Some(wifi);
        }

        let wifi = guard.as_mut().expect("wifi initialised above");

        let auth_method = if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let client_config = ClientConfiguration {
            ssid: ssid.try_into().map_err(|_| ConnectivityError::InvalidSsid)?,
            password: password
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        };
        wifi.set_configuration(&Configuration::Client(client_config))
            .map_err(|_| ConnectivityError::ConnectionFailed)?;

        wifi.start().map_err(|_| ConnectivityError::ConnectionFailed)?;
        wifi.connect().map_err(|_| ConnectivityError::ConnectionFailed)?;
        wifi.wait_netif_up()
            .map_err(|_| ConnectivityError::ConnectionFailed)?;
        Ok(())
    }

    pub fn is_connected() -> bool {
        WIFI.lock()
            .ok()
            .and_then(|g| g.as_ref().map(|w| w.is_connected().unwrap_or(false)))
            .unwrap_or(false)
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
