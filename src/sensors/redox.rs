//! Redox (ORP) probe measurement.
//!
//! The electrode pair sits on AIN6(+)/AIN7(−) of the AD7124.  One
//! measurement is: status LED pin LOW, one single conversion, LED pin
//! HIGH, counts → volts.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: conversions come from the AD7124 driver.
//! On host/test: [`SimRedoxAdc`] reads a static `AtomicI32` for injection;
//! a negative value simulates a failed read.

use core::sync::atomic::{AtomicI32, Ordering};

use embedded_hal::digital::PinState;

use crate::app::ports::{ActuatorPort, AdcPort};
use crate::config::AdcSettings;
use crate::error::SensorError;

/// Mid-scale in bipolar coding: 0 V.
static SIM_REDOX_RAW: AtomicI32 = AtomicI32::new(0x80_0000);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_redox_raw(raw: i32) {
    SIM_REDOX_RAW.store(raw, Ordering::Relaxed);
}

/// Host-side stand-in for the AD7124.
#[derive(Debug, Default)]
pub struct SimRedoxAdc;

impl AdcPort for SimRedoxAdc {
    fn read_raw(&mut self, _channel: u8) -> Result<u32, SensorError> {
        let raw = SIM_REDOX_RAW.load(Ordering::Relaxed);
        u32::try_from(raw).map_err(|_| SensorError::AdcReadFailed)
    }
}

pub struct RedoxProbe {
    settings: AdcSettings,
}

impl RedoxProbe {
    pub fn new(settings: AdcSettings) -> Self {
        Self { settings }
    }

    /// Take one reading.  The LED pin is pulsed LOW for the duration of
    /// the conversion whether or not it succeeds.
    pub fn measure(&self, hw: &mut (impl AdcPort + ActuatorPort)) -> Result<f32, SensorError> {
        hw.set_indicator(PinState::Low);
        let raw = hw.read_raw(self.settings.channel);
        hw.set_indicator(PinState::High);
        raw.map(|counts| self.settings.to_volts(counts))
    }
}
