//! Outbound application events.
//!
//! The [`RedoxController`](super::controller::RedoxController) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Each event
//! knows its severity and renders as a single console line.

use core::fmt;

use log::Level;

use crate::error::SensorError;

/// Structured events emitted by the control loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    /// The controller has started.
    Started { setpoint_volts: f32 },

    /// A voltage was read from the probe.
    Measured { volts: f32 },

    /// The pump is about to run.
    PumpActivated { duration_ms: u32 },

    /// Redox too low, but the pump ran too recently.
    PumpCoolingDown { remaining_ms: u32 },

    /// Reading is at or below the setpoint; nothing to do.
    RedoxOk { volts: f32 },

    /// The probe could not be read; the cycle was skipped.
    SensorFault(SensorError),

    /// The probe could not be read; the previous voltage stands in.
    StaleReadingReused { error: SensorError, volts: f32 },

    /// Run counters since boot, reported after every pump run.
    RunStats {
        cycles: u64,
        activations: u64,
        faults: u64,
    },
}

impl AppEvent {
    /// Console severity for this event.
    pub fn level(&self) -> Level {
        match self {
            Self::PumpCoolingDown { .. } | Self::SensorFault(_) | Self::StaleReadingReused { .. } => {
                Level::Warn
            }
            _ => Level::Info,
        }
    }
}

impl fmt::Display for AppEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started { setpoint_volts } => {
                write!(f, "Controller started, setpoint {:.3}V", setpoint_volts)
            }
            Self::Measured { volts } => write!(f, "Voltage: {:5.3}V", volts),
            Self::PumpActivated { .. } => write!(f, "Motor has been activated"),
            Self::PumpCoolingDown { .. } => {
                write!(f, "Redox too low, but pump already activated recently")
            }
            Self::RedoxOk { .. } => write!(f, "Redox ok"),
            Self::SensorFault(e) => write!(f, "Sensor fault ({}), skipping cycle", e),
            Self::StaleReadingReused { error, volts } => {
                write!(f, "Sensor fault ({}), reusing last reading {:.3}V", error, volts)
            }
            Self::RunStats {
                cycles,
                activations,
                faults,
            } => write!(
                f,
                "Status: {} cycles, {} pump runs, {} sensor faults",
                cycles, activations, faults
            ),
        }
    }
}
