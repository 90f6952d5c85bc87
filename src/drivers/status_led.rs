//! Single-colour status LED on one GPIO.
//!
//! The LED is wired between 3V3 and the pin, so it lights when the pin is
//! driven LOW.  The driver works in pin levels; callers decide what a
//! level means.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the GPIO via hw_init.
//! On host/test: tracks state in-memory only.

use embedded_hal::digital::PinState;

use crate::drivers::hw_init;

pub struct StatusLed {
    gpio: i32,
    level: PinState,
}

impl StatusLed {
    pub fn new(gpio: i32) -> Self {
        Self {
            gpio,
            level: PinState::Low,
        }
    }

    pub fn set(&mut self, level: PinState) {
        hw_init::gpio_write(self.gpio, level == PinState::High);
        self.level = level;
    }

    pub fn is_lit(&self) -> bool {
        self.level == PinState::Low
    }
}
