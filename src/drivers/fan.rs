//! Cooling fan driver (logic-level MOSFET on a LEDC PWM pin).
//!
//! Binary control: the pin is PWM-capable but this design drives it fully
//! on (duty 255) or fully off (duty 0) — no intermediate duty cycle.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the real LEDC channel via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;

pub struct FanDriver {
    on: bool,
}

impl FanDriver {
    pub fn new() -> Self {
        Self { on: false }
    }

    pub fn enable(&mut self) {
        self.set_duty_hw(u8::MAX);
        self.on = true;
    }

    pub fn disable(&mut self) {
        self.set_duty_hw(0);
        self.on = false;
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    fn set_duty_hw(&self, duty: u8) {
        hw_init::ledc_set(hw_init::LEDC_CH_FAN, duty);
    }
}
