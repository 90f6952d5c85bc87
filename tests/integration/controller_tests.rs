//! Integration tests for the measure → decide → pump pipeline.
//!
//! These run on the host (x86_64) and drive [`RedoxController`] through
//! mock adapters, checking pin sequences, timestamps and emitted events.

use embedded_hal::digital::PinState;
use embedded_hal::delay::DelayNs;
use redoxmeter::app::controller::{CycleOutcome, RedoxController};
use redoxmeter::app::events::AppEvent;
use redoxmeter::config::{ControllerConfig, SensorFaultPolicy};
use redoxmeter::drivers::ad7124::Gain;
use redoxmeter::error::SensorError;

use super::mock_hw::{EventLog, HwCall, MockClock, MockHardware};

/// 1.0 V setpoint on a ±2.5 V front-end, 5 s / 10 min / 2 s timing.
fn bench_config() -> ControllerConfig {
    let mut config = ControllerConfig::default();
    config.adc.gain = Gain::X1;
    config.setpoint_volts = 1.0;
    config.measurement_interval_ms = 5_000;
    config.pump_cooldown_ms = 600_000;
    config.pump_run_ms = 2_000;
    config
}

/// Bipolar code for `volts` at unity gain and a 2.5 V reference.
fn raw_for(volts: f32) -> u32 {
    ((volts / 2.5 + 1.0) * 8_388_607.0) as u32
}

fn started(config: ControllerConfig) -> (RedoxController, EventLog) {
    let mut controller = RedoxController::new(config);
    let mut boot_hw = MockHardware::reading(0);
    let mut sink = EventLog::new();
    controller.start(&mut boot_hw, &mut sink);
    sink.clear();
    (controller, sink)
}

// ── Boot ──────────────────────────────────────────────────────

#[test]
fn start_drives_both_outputs_low() {
    let mut controller = RedoxController::new(bench_config());
    let mut hw = MockHardware::reading(0);
    let mut sink = EventLog::new();

    controller.start(&mut hw, &mut sink);

    assert_eq!(
        hw.calls,
        vec![HwCall::Pump(PinState::Low), HwCall::Indicator(PinState::Low)]
    );
    assert_eq!(sink.events, vec![AppEvent::Started { setpoint_volts: 1.0 }]);
}

// ── Scenario 1: too low, never run ───────────────────────────

#[test]
fn too_low_reading_runs_pump_for_configured_time() {
    let (mut controller, mut sink) = started(bench_config());
    let mut hw = MockHardware::reading(raw_for(1.5));
    let mut clock = MockClock::at(0);

    let outcome = controller.run_cycle(&mut hw, &mut clock, &mut sink);

    assert_eq!(outcome, CycleOutcome::PumpActivated);
    assert_eq!(
        hw.calls,
        vec![
            HwCall::Indicator(PinState::Low),
            HwCall::Read(0),
            HwCall::Indicator(PinState::High),
            HwCall::Indicator(PinState::High),
            HwCall::Pump(PinState::High),
            HwCall::Pump(PinState::Low),
            HwCall::Indicator(PinState::Low),
        ]
    );
    assert_eq!(clock.blocked_ms, 2_000);
    // Stamped when the blocking run returns.
    assert_eq!(controller.last_run_ms(), Some(2_000));
    assert_eq!(controller.activation_count(), 1);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::PumpActivated { duration_ms: 2_000 })),
        1
    );
    assert!(matches!(sink.events[0], AppEvent::Measured { volts } if (volts - 1.5).abs() < 1e-3));
}

// ── Scenario 2: too low, inside cooldown ─────────────────────

#[test]
fn second_too_low_reading_inside_cooldown_only_warns() {
    let (mut controller, mut sink) = started(bench_config());
    let mut hw = MockHardware::reading(raw_for(1.5));
    let mut clock = MockClock::at(0);
    controller.run_cycle(&mut hw, &mut clock, &mut sink);

    hw.clear();
    sink.clear();
    clock.now = 10_000;
    let outcome = controller.run_cycle(&mut hw, &mut clock, &mut sink);

    assert_eq!(
        outcome,
        CycleOutcome::CoolingDown {
            remaining_ms: 600_000 - 8_000
        }
    );
    assert!(hw.pump_calls().is_empty());
    assert_eq!(controller.last_run_ms(), Some(2_000));
    assert_eq!(sink.warnings(), 1);
    assert_eq!(clock.blocked_ms, 2_000);
}

#[test]
fn pump_runs_again_once_cooldown_has_elapsed() {
    let (mut controller, mut sink) = started(bench_config());
    let mut hw = MockHardware::reading(raw_for(1.5));
    let mut clock = MockClock::at(0);
    controller.run_cycle(&mut hw, &mut clock, &mut sink);

    clock.now = 2_000 + 600_000 - 1;
    assert!(matches!(
        controller.run_cycle(&mut hw, &mut clock, &mut sink),
        CycleOutcome::CoolingDown { remaining_ms: 1 }
    ));

    clock.now = 2_000 + 600_000;
    assert_eq!(
        controller.run_cycle(&mut hw, &mut clock, &mut sink),
        CycleOutcome::PumpActivated
    );
    assert_eq!(controller.last_run_ms(), Some(604_000));
    assert_eq!(controller.activation_count(), 2);
}

// ── Scenario 3: exactly at setpoint ──────────────────────────

#[test]
fn reading_equal_to_setpoint_is_ok() {
    let mut config = bench_config();
    let raw = raw_for(1.0);
    config.setpoint_volts = config.adc.to_volts(raw);
    let (mut controller, mut sink) = started(config);
    let mut hw = MockHardware::reading(raw);
    let mut clock = MockClock::at(0);

    let outcome = controller.run_cycle(&mut hw, &mut clock, &mut sink);

    assert_eq!(outcome, CycleOutcome::RedoxOk);
    assert!(hw.pump_calls().is_empty());
    assert_eq!(sink.count(|e| matches!(e, AppEvent::RedoxOk { .. })), 1);
    assert_eq!(sink.warnings(), 0);
    assert_eq!(controller.last_run_ms(), None);
}

#[test]
fn ok_reading_ignores_cooldown_state() {
    let (mut controller, mut sink) = started(bench_config());
    let mut hw = MockHardware::reading(raw_for(1.5));
    let mut clock = MockClock::at(0);
    controller.run_cycle(&mut hw, &mut clock, &mut sink);

    for (now, volts) in [(3_000, 0.2), (500_000, -1.0), (900_000, 0.99)] {
        hw.push(Ok(raw_for(volts)));
        hw.clear();
        sink.clear();
        clock.now = now;

        assert_eq!(
            controller.run_cycle(&mut hw, &mut clock, &mut sink),
            CycleOutcome::RedoxOk
        );
        assert!(hw.pump_calls().is_empty());
        assert_eq!(sink.count(|e| matches!(e, AppEvent::RedoxOk { .. })), 1);
    }
    assert_eq!(controller.last_run_ms(), Some(2_000));
}

// ── Scenario 4: failed conversion ────────────────────────────

#[test]
fn reuse_policy_decides_on_last_good_reading() {
    let mut config = bench_config();
    config.sensor_fault_policy = SensorFaultPolicy::ReuseLastReading;
    let (mut controller, mut sink) = started(config);
    let mut hw = MockHardware::reading(raw_for(1.5));
    let mut clock = MockClock::at(0);
    controller.run_cycle(&mut hw, &mut clock, &mut sink);
    let last = controller.last_good_volts();

    hw.push(Err(SensorError::AdcReadFailed));
    sink.clear();
    clock.now = 700_000;
    let outcome = controller.run_cycle(&mut hw, &mut clock, &mut sink);

    assert_eq!(outcome, CycleOutcome::PumpActivated);
    assert_eq!(controller.fault_count(), 1);
    assert_eq!(controller.last_good_volts(), last);
    assert!(matches!(
        sink.events[0],
        AppEvent::StaleReadingReused {
            error: SensorError::AdcReadFailed,
            ..
        }
    ));
}

#[test]
fn reuse_policy_without_history_holds_off() {
    let mut config = bench_config();
    config.sensor_fault_policy = SensorFaultPolicy::ReuseLastReading;
    let (mut controller, mut sink) = started(config);
    let mut hw = MockHardware::reading(0);
    hw.push(Err(SensorError::ConversionTimeout));
    let mut clock = MockClock::at(0);

    let outcome = controller.run_cycle(&mut hw, &mut clock, &mut sink);

    assert_eq!(outcome, CycleOutcome::SensorFault(SensorError::ConversionTimeout));
    assert!(hw.pump_calls().is_empty());
}

#[test]
fn hold_off_policy_never_pumps_on_a_fault() {
    let (mut controller, mut sink) = started(bench_config());
    let mut hw = MockHardware::reading(raw_for(1.5));
    let mut clock = MockClock::at(0);
    controller.run_cycle(&mut hw, &mut clock, &mut sink);

    hw.push(Err(SensorError::AdcReadFailed));
    hw.clear();
    sink.clear();
    clock.now = 700_000;
    let outcome = controller.run_cycle(&mut hw, &mut clock, &mut sink);

    assert_eq!(outcome, CycleOutcome::SensorFault(SensorError::AdcReadFailed));
    assert!(hw.pump_calls().is_empty());
    assert_eq!(sink.events, vec![AppEvent::SensorFault(SensorError::AdcReadFailed)]);
    assert_eq!(controller.last_run_ms(), Some(2_000));
    assert_eq!(controller.fault_count(), 1);
    // The LED pulse still brackets the failed conversion.
    assert_eq!(hw.calls.last(), Some(&HwCall::Indicator(PinState::High)));
}

#[test]
fn every_pump_run_reports_run_counters() {
    let mut config = bench_config();
    config.sensor_fault_policy = SensorFaultPolicy::ReuseLastReading;
    let (mut controller, mut sink) = started(config);
    let mut hw = MockHardware::reading(raw_for(1.5));
    let mut clock = MockClock::at(0);

    controller.run_cycle(&mut hw, &mut clock, &mut sink);
    assert_eq!(
        sink.events.last(),
        Some(&AppEvent::RunStats {
            cycles: 1,
            activations: 1,
            faults: 0
        })
    );

    // Inside the cooldown: no status line.
    sink.clear();
    clock.now = 10_000;
    controller.run_cycle(&mut hw, &mut clock, &mut sink);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::RunStats { .. })), 0);

    hw.push(Err(SensorError::AdcReadFailed));
    clock.now = 700_000;
    controller.run_cycle(&mut hw, &mut clock, &mut sink);
    assert_eq!(
        sink.events.last(),
        Some(&AppEvent::RunStats {
            cycles: 3,
            activations: 2,
            faults: 1
        })
    );
}

// ── Polling ───────────────────────────────────────────────────

#[test]
fn poll_waits_strictly_longer_than_the_interval() {
    let (mut controller, mut sink) = started(bench_config());
    let mut hw = MockHardware::reading(raw_for(0.0));
    let mut clock = MockClock::at(5_000);

    assert_eq!(controller.poll(&mut hw, &mut clock, &mut sink), None);
    assert_eq!(hw.read_count(), 0);

    clock.now = 5_001;
    assert_eq!(
        controller.poll(&mut hw, &mut clock, &mut sink),
        Some(CycleOutcome::RedoxOk)
    );
    assert_eq!(controller.last_measurement_ms(), 5_001);

    clock.now = 10_001;
    assert_eq!(controller.poll(&mut hw, &mut clock, &mut sink), None);
    clock.now = 10_002;
    assert!(controller.poll(&mut hw, &mut clock, &mut sink).is_some());
    assert_eq!(controller.cycle_count(), 2);
    assert_eq!(hw.read_count(), 2);
}

#[test]
fn polling_loop_measures_at_interval_cadence() {
    let mut config = bench_config();
    config.poll_interval_ms = 100;
    let (mut controller, mut sink) = started(config);
    let mut hw = MockHardware::reading(raw_for(0.0));
    let mut clock = MockClock::at(0);

    // One minute of loop iterations.
    while clock.now < 60_000 {
        controller.poll(&mut hw, &mut clock, &mut sink);
        clock.delay_ms(100);
    }

    // First cycle at 5_100, then every 5_100 ms on a 100 ms grid.
    assert_eq!(controller.cycle_count(), 11);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::RedoxOk { .. })), 11);
}

#[test]
fn cooldown_holds_across_clock_wrap() {
    let (mut controller, mut sink) = started(bench_config());
    let mut hw = MockHardware::reading(raw_for(1.5));
    let mut clock = MockClock::at(u32::MAX - 1_000);

    assert_eq!(
        controller.run_cycle(&mut hw, &mut clock, &mut sink),
        CycleOutcome::PumpActivated
    );
    assert_eq!(controller.last_run_ms(), Some(999));

    clock.now = 100_999;
    assert!(matches!(
        controller.run_cycle(&mut hw, &mut clock, &mut sink),
        CycleOutcome::CoolingDown { remaining_ms: 500_000 }
    ));
}
