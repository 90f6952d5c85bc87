//! Redox control loop: the hexagonal core.
//!
//! [`RedoxController`] owns the loop's only state (two timestamps, the
//! last good reading, run counters).  All I/O flows through port traits
//! passed into each call, so the loop is testable with mock adapters.
//!
//! ```text
//!      AdcPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                  │    RedoxController      │
//! ActuatorPort ◀── │  measure · decide · run │ ◀── Clock + DelayNs
//!                  └────────────────────────┘
//! ```
//!
//! Everything blocks.  A pump run holds the loop for its full duration.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;
use log::info;

use crate::config::{ControllerConfig, SensorFaultPolicy};
use crate::control::decision::{self, Decision};
use crate::error::SensorError;
use crate::sensors::redox::RedoxProbe;

use super::events::AppEvent;
use super::ports::{ActuatorPort, AdcPort, Clock, EventSink};

/// Result of one measurement cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    PumpActivated,
    CoolingDown { remaining_ms: u32 },
    RedoxOk,
    SensorFault(SensorError),
}

pub struct RedoxController {
    config: ControllerConfig,
    probe: RedoxProbe,
    last_measurement_ms: u32,
    /// `None` until the pump has run once.
    last_run_ms: Option<u32>,
    last_good_volts: Option<f32>,
    cycle_count: u64,
    activation_count: u64,
    fault_count: u64,
}

impl RedoxController {
    /// The measurement timer starts at 0 (boot), so the first cycle runs
    /// once uptime exceeds the measurement interval.
    pub fn new(config: ControllerConfig) -> Self {
        let probe = RedoxProbe::new(config.adc.clone());
        Self {
            config,
            probe,
            last_measurement_ms: 0,
            last_run_ms: None,
            last_good_volts: None,
            cycle_count: 0,
            activation_count: 0,
            fault_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive both outputs to their power-on level and announce the start.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        hw.set_pump(PinState::Low);
        hw.set_indicator(PinState::Low);
        sink.emit(&AppEvent::Started {
            setpoint_volts: self.config.setpoint_volts,
        });
        info!(
            "RedoxController started: interval={}ms cooldown={}ms run={}ms policy={:?}",
            self.config.measurement_interval_ms,
            self.config.pump_cooldown_ms,
            self.config.pump_run_ms,
            self.config.sensor_fault_policy,
        );
    }

    /// Poll forever.  There is no shutdown path.
    pub fn run(
        &mut self,
        hw: &mut (impl AdcPort + ActuatorPort),
        clock: &mut (impl Clock + DelayNs),
        sink: &mut impl EventSink,
    ) -> ! {
        loop {
            self.poll(hw, clock, sink);
            clock.delay_ms(self.config.poll_interval_ms);
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// One loop iteration: run a measurement cycle if the measurement
    /// interval has strictly elapsed, otherwise do nothing.
    pub fn poll(
        &mut self,
        hw: &mut (impl AdcPort + ActuatorPort),
        clock: &mut (impl Clock + DelayNs),
        sink: &mut impl EventSink,
    ) -> Option<CycleOutcome> {
        let now = clock.now_ms();
        if decision::elapsed_ms(now, self.last_measurement_ms) <= self.config.measurement_interval_ms {
            return None;
        }
        Some(self.run_cycle(hw, clock, sink))
    }

    /// Measure, decide, and act, unconditionally.
    pub fn run_cycle(
        &mut self,
        hw: &mut (impl AdcPort + ActuatorPort),
        clock: &mut (impl Clock + DelayNs),
        sink: &mut impl EventSink,
    ) -> CycleOutcome {
        self.last_measurement_ms = clock.now_ms();
        self.cycle_count += 1;

        let volts = match self.measure(hw, sink) {
            Ok(v) => v,
            Err(e) => match self.fallback_reading(e, sink) {
                Some(v) => v,
                None => return CycleOutcome::SensorFault(e),
            },
        };

        // Conversions take up to ~650 ms; judge the cooldown after them.
        match self.decide(volts, clock.now_ms()) {
            Decision::ActivatePump => {
                self.activate_pump_for(self.config.pump_run_ms, hw, clock, sink);
                self.last_run_ms = Some(clock.now_ms());
                self.activation_count += 1;
                sink.emit(&AppEvent::RunStats {
                    cycles: self.cycle_count,
                    activations: self.activation_count,
                    faults: self.fault_count,
                });
                CycleOutcome::PumpActivated
            }
            Decision::CoolingDown { remaining_ms } => {
                sink.emit(&AppEvent::PumpCoolingDown { remaining_ms });
                CycleOutcome::CoolingDown { remaining_ms }
            }
            Decision::RedoxOk => {
                sink.emit(&AppEvent::RedoxOk { volts });
                CycleOutcome::RedoxOk
            }
        }
    }

    // ── Building blocks ───────────────────────────────────────

    /// Read the probe once and report the voltage.
    pub fn measure(
        &mut self,
        hw: &mut (impl AdcPort + ActuatorPort),
        sink: &mut impl EventSink,
    ) -> Result<f32, SensorError> {
        let volts = self.probe.measure(hw)?;
        sink.emit(&AppEvent::Measured { volts });
        self.last_good_volts = Some(volts);
        Ok(volts)
    }

    /// Threshold plus cooldown for `volts` at time `now_ms`.  No side effects.
    pub fn decide(&self, volts: f32, now_ms: u32) -> Decision {
        decision::decide(
            volts,
            self.config.setpoint_volts,
            now_ms,
            self.last_run_ms,
            self.config.pump_cooldown_ms,
        )
    }

    /// Run the pump for `duration_ms`, blocking.  The LED pin follows the
    /// pump pin.
    pub fn activate_pump_for(
        &mut self,
        duration_ms: u32,
        hw: &mut impl ActuatorPort,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) {
        sink.emit(&AppEvent::PumpActivated { duration_ms });
        hw.set_indicator(PinState::High);
        hw.set_pump(PinState::High);
        delay.delay_ms(duration_ms);
        hw.set_pump(PinState::Low);
        hw.set_indicator(PinState::Low);
    }

    /// Apply the configured [`SensorFaultPolicy`] to a failed read.
    fn fallback_reading(&mut self, error: SensorError, sink: &mut impl EventSink) -> Option<f32> {
        self.fault_count += 1;
        match (self.config.sensor_fault_policy, self.last_good_volts) {
            (SensorFaultPolicy::ReuseLastReading, Some(volts)) => {
                sink.emit(&AppEvent::StaleReadingReused { error, volts });
                Some(volts)
            }
            _ => {
                sink.emit(&AppEvent::SensorFault(error));
                None
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn last_measurement_ms(&self) -> u32 {
        self.last_measurement_ms
    }

    pub fn last_run_ms(&self) -> Option<u32> {
        self.last_run_ms
    }

    /// Last voltage read without error.
    pub fn last_good_volts(&self) -> Option<f32> {
        self.last_good_volts
    }

    /// Measurement cycles executed since startup.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn activation_count(&self) -> u64 {
        self.activation_count
    }

    pub fn fault_count(&self) -> u64 {
        self.fault_count
    }
}
