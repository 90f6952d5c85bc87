//! Controller configuration.
//!
//! Every tunable lives here and is fixed at compile time through
//! [`ControllerConfig::default`].  The struct is serialisable only so the
//! boot log can dump the effective values; nothing is ever loaded at runtime.

use serde::{Deserialize, Serialize};

use crate::drivers::ad7124::{self, Gain, PowerMode, Reference};
use crate::error::{Error, Result};

/// What the control loop does with a cycle whose ADC read failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorFaultPolicy {
    /// Treat the cycle as unknown: warn, never run the pump.
    HoldOff,
    /// Re-use the last good voltage for the threshold decision.
    ReuseLastReading,
}

/// AD7124 front-end setup for the redox probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdcSettings {
    /// Conversion channel (0-15).
    pub channel: u8,
    /// Setup slot (0-7) the channel is bound to.
    pub setup: u8,
    /// Positive analog input (AINx).
    pub positive_input: u8,
    /// Negative analog input (AINx).
    pub negative_input: u8,
    pub gain: Gain,
    pub reference: Reference,
    pub bipolar: bool,
    /// Reference voltage used for the count → volts conversion.
    pub vref_volts: f32,
    pub power_mode: PowerMode,
    /// IO_CONTROL_2 mask of inputs that get the AVDD/2 bias voltage.
    pub bias_pins: u16,
}

impl AdcSettings {
    /// Largest magnitude the front-end can report, in volts.
    pub fn full_scale_volts(&self) -> f32 {
        self.vref_volts / self.gain.factor() as f32
    }

    /// Convert a raw conversion result with this front-end's settings.
    pub fn to_volts(&self, raw: u32) -> f32 {
        ad7124::counts_to_volts(raw, self.gain.factor(), self.vref_volts, self.bipolar)
    }
}

impl Default for AdcSettings {
    fn default() -> Self {
        Self {
            channel: 0,
            setup: 0,
            positive_input: 6,
            negative_input: 7,
            gain: Gain::X4,
            reference: Reference::Internal,
            bipolar: true,
            vref_volts: 2.5,
            power_mode: PowerMode::Low,
            bias_pins: 0x0080,
        }
    }
}

/// Core controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    // --- Threshold ---
    /// Probe voltage above which the pump is requested.
    pub setpoint_volts: f32,

    // --- Timing ---
    /// Minimum time between two measurements (milliseconds).
    pub measurement_interval_ms: u32,
    /// Minimum time between the end of one pump run and the next (milliseconds).
    pub pump_cooldown_ms: u32,
    /// How long a single pump activation lasts (milliseconds).
    pub pump_run_ms: u32,
    /// Sleep between two loop iterations (milliseconds).
    pub poll_interval_ms: u32,

    // --- Faults ---
    pub sensor_fault_policy: SensorFaultPolicy,

    // --- Front-end ---
    pub adc: AdcSettings,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            setpoint_volts: 0.45,

            measurement_interval_ms: 5_000, // 0.2 Hz
            pump_cooldown_ms: 600_000,      // 10 min
            pump_run_ms: 2_000,
            poll_interval_ms: 100,

            sensor_fault_policy: SensorFaultPolicy::HoldOff,

            adc: AdcSettings::default(),
        }
    }
}

impl ControllerConfig {
    /// Range-check every field.  Called once at boot; an invalid build
    /// never enters the control loop.
    pub fn validate(&self) -> Result<()> {
        if !self.setpoint_volts.is_finite() {
            return Err(Error::Config("setpoint must be finite"));
        }
        if !self.adc.vref_volts.is_finite() || self.adc.vref_volts <= 0.0 {
            return Err(Error::Config("reference voltage must be positive"));
        }
        let span = self.adc.full_scale_volts();
        let lower = if self.adc.bipolar { -span } else { 0.0 };
        if self.setpoint_volts <= lower || self.setpoint_volts >= span {
            return Err(Error::Config("setpoint outside the ADC input span"));
        }
        if self.measurement_interval_ms == 0 {
            return Err(Error::Config("measurement interval must be non-zero"));
        }
        if self.poll_interval_ms == 0 || self.poll_interval_ms > self.measurement_interval_ms {
            return Err(Error::Config("poll interval must be in 1..=measurement interval"));
        }
        if self.pump_run_ms == 0 {
            return Err(Error::Config("pump run time must be non-zero"));
        }
        if self.pump_run_ms >= self.pump_cooldown_ms {
            return Err(Error::Config("pump run time must be shorter than the cooldown"));
        }
        // Elapsed times are taken on a wrapping u32 counter; anything past
        // half its range becomes ambiguous.
        if self.pump_cooldown_ms > i32::MAX as u32 || self.measurement_interval_ms > i32::MAX as u32 {
            return Err(Error::Config("interval exceeds half the timer range"));
        }
        if self.adc.channel > 15 || self.adc.setup > 7 {
            return Err(Error::Config("ADC channel/setup index out of range"));
        }
        if self.adc.positive_input > 31 || self.adc.negative_input > 31 {
            return Err(Error::Config("ADC input index out of range"));
        }
        Ok(())
    }
}
