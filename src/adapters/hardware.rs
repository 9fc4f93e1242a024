//! Hardware adapter — bridges the real fan peripheral to the domain port.
//!
//! This is the only module in the system that touches actual actuator
//! hardware. On non-espidf targets, the underlying driver uses cfg-gated
//! simulation stubs.

use crate::app::ports::ActuatorPort;
use crate::drivers::fan::FanDriver;

/// Concrete adapter exposing the fan driver behind [`ActuatorPort`].
pub struct HardwareAdapter {
    fan: FanDriver,
}

impl HardwareAdapter {
    pub fn new(fan: FanDriver) -> Self {
        Self { fan }
    }
}

impl ActuatorPort for HardwareAdapter {
    fn set_fan(&mut self, on: bool) {
        if on {
            self.fan.enable();
        } else {
            self.fan.disable();
        }
    }

    fn is_fan_on(&self) -> bool {
        self.fan.is_on()
    }

    fn all_off(&mut self) {
        self.fan.disable();
    }
}
