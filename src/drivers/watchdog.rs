//! Task Watchdog Timer (TWDT) wrapper.
//!
//! The main loop subscribes once at boot and must call [`Watchdog::feed`]
//! on every iteration; a stall longer than [`TIMEOUT_MS`] panics and
//! resets the device.

/// Main-loop stall budget before the TWDT fires.
pub const TIMEOUT_MS: u32 = 10_000;

pub struct Watchdog {
    subscribed: bool,
}

impl Watchdog {
    /// Configure the TWDT and subscribe the current task.
    pub fn subscribe() -> Self {
        let subscribed = platform_subscribe();
        if subscribed {
            log::info!("watchdog: armed ({}ms timeout)", TIMEOUT_MS);
        } else {
            log::warn!("watchdog: not armed, running unsupervised");
        }
        Self { subscribed }
    }

    /// Reset the stall timer.
    pub fn feed(&self) {
        if self.subscribed {
            platform_feed();
        }
    }
}

#[cfg(target_os = "espidf")]
fn platform_subscribe() -> bool {
    use esp_idf_svc::sys::*;
    let cfg = esp_task_wdt_config_t {
        timeout_ms: TIMEOUT_MS,
        idle_core_mask: 0,
        trigger_panic: true,
    };
    // SAFETY: called once from the main task before the event loop;
    // esp_task_wdt_reconfigure tolerates an already-initialised TWDT.
    unsafe {
        if esp_task_wdt_reconfigure(&cfg) != ESP_OK {
            log::warn!("watchdog: TWDT reconfigure rejected, using defaults");
        }
        esp_task_wdt_add(core::ptr::null_mut()) == ESP_OK
    }
}

#[cfg(not(target_os = "espidf"))]
fn platform_subscribe() -> bool {
    false
}

#[cfg(target_os = "espidf")]
fn platform_feed() {
    // SAFETY: the current task was registered in platform_subscribe().
    unsafe {
        esp_idf_svc::sys::esp_task_wdt_reset();
    }
}

#[cfg(not(target_os = "espidf"))]
fn platform_feed() {}
