//! Dosing pump relay driver.
//!
//! One digital output drives the relay coil transistor: HIGH = pump on.
//! No speed control, no direction.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the GPIO via hw_init helpers.
//! On host/test: tracks state in-memory only.

use embedded_hal::digital::PinState;
use log::debug;

use crate::drivers::hw_init;

pub struct PumpDriver {
    gpio: i32,
    level: PinState,
}

impl PumpDriver {
    pub fn new(gpio: i32) -> Self {
        Self {
            gpio,
            level: PinState::Low,
        }
    }

    pub fn set(&mut self, level: PinState) {
        hw_init::gpio_write(self.gpio, level == PinState::High);
        if level != self.level {
            debug!("pump relay: {:?}", level);
        }
        self.level = level;
    }

    pub fn stop(&mut self) {
        self.set(PinState::Low);
    }

    pub fn is_running(&self) -> bool {
        self.level == PinState::High
    }
}
