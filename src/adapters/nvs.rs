//! NVS (Non-Volatile Storage) configuration adapter.
//!
//! Implements [`ConfigPort`] — load-only. The configuration blob
//! (postcard-encoded [`SystemConfig`]) is written to the `nozzlefan`
//! namespace by the provisioning tool; the firmware itself never writes
//! config at runtime. A missing or corrupted blob falls back to
//! [`SystemConfig::default()`] at the call site.

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;
use log::info;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const CONFIG_NAMESPACE: &str = "nozzlefan";
const CONFIG_KEY: &str = "syscfg";
const MAX_BLOB_SIZE: usize = 512;

pub struct NvsAdapter {
    _private: (),
}

impl NvsAdapter {
    /// Create the adapter and initialise NVS flash.
    ///
    /// On first boot or after an IDF version mismatch the NVS partition is
    /// erased and re-initialised automatically.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase run from the single
            // main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                log::warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(ConfigError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend (always empty)");

        Ok(Self { _private: () })
    }

    #[cfg(target_os = "espidf")]
    fn read_blob(&self, buf: &mut [u8]) -> Result<usize, ConfigError> {
        let mut ns_buf = [0u8; 16];
        let ns = CONFIG_NAMESPACE.as_bytes();
        ns_buf[..ns.len()].copy_from_slice(ns);
        let mut key_buf = [0u8; 16];
        let key = CONFIG_KEY.as_bytes();
        key_buf[..key.len()].copy_from_slice(key);

        let mut handle: nvs_handle_t = 0;
        // SAFETY: ns_buf/key_buf are NUL-terminated by construction; the
        // handle is opened and closed within this call, main task only.
        unsafe {
            let ret = nvs_open(
                ns_buf.as_ptr().cast(),
                nvs_open_mode_t_NVS_READONLY,
                &mut handle,
            );
            if ret == ESP_ERR_NVS_NOT_FOUND {
                return Err(ConfigError::NotFound);
            }
            if ret != ESP_OK {
                return Err(ConfigError::IoError);
            }

            let mut len = buf.len();
            let ret = nvs_get_blob(handle, key_buf.as_ptr().cast(), buf.as_mut_ptr().cast(), &mut len);
            nvs_close(handle);

            match ret {
                x if x == ESP_OK => Ok(len),
                x if x == ESP_ERR_NVS_NOT_FOUND => Err(ConfigError::NotFound),
                _ => Err(ConfigError::IoError),
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_blob(&self, _buf: &mut [u8]) -> Result<usize, ConfigError> {
        // Host builds carry no provisioned config.
        log::debug!("NVS(sim): no blob at {}/{}", CONFIG_NAMESPACE, CONFIG_KEY);
        Err(ConfigError::NotFound)
    }
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let mut buf = [0u8; MAX_BLOB_SIZE];
        let len = self.read_blob(&mut buf)?;
        let config: SystemConfig =
            postcard::from_bytes(&buf[..len]).map_err(|_| ConfigError::Corrupted)?;
        info!(
            "NvsAdapter: config loaded (broker={}, threshold={:.1}\u{00b0}C)",
            config.mqtt_broker, config.threshold_c
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_backend_reports_not_found() {
        let nvs = NvsAdapter::new().unwrap();
        assert_eq!(nvs.load().unwrap_err(), ConfigError::NotFound);
    }
}
