//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the converter and both output drivers, exposing them through
//! [`AdcPort`] and [`ActuatorPort`].  Generic over the converter so the
//! same adapter runs on the AD7124 and on the host simulation.

use embedded_hal::digital::PinState;

use crate::app::ports::{ActuatorPort, AdcPort};
use crate::drivers::pump::PumpDriver;
use crate::drivers::status_led::StatusLed;
use crate::error::SensorError;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<A> {
    adc: A,
    pump: PumpDriver,
    led: StatusLed,
}

impl<A: AdcPort> HardwareAdapter<A> {
    pub fn new(adc: A, pump: PumpDriver, led: StatusLed) -> Self {
        Self { adc, pump, led }
    }

    pub fn pump(&self) -> &PumpDriver {
        &self.pump
    }

    pub fn led(&self) -> &StatusLed {
        &self.led
    }
}

// ── AdcPort implementation ────────────────────────────────────

impl<A: AdcPort> AdcPort for HardwareAdapter<A> {
    fn read_raw(&mut self, channel: u8) -> Result<u32, SensorError> {
        self.adc.read_raw(channel)
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<A: AdcPort> ActuatorPort for HardwareAdapter<A> {
    fn set_indicator(&mut self, level: PinState) {
        self.led.set(level);
    }

    fn set_pump(&mut self, level: PinState) {
        self.pump.set(level);
    }
}
