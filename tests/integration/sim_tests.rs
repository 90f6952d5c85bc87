//! End-to-end run of the real adapter stack on the host simulation.
//!
//! `HardwareAdapter<SimRedoxAdc>` with the pump and LED drivers, fed
//! through the injectable simulated conversion result.  Kept to a single
//! test: the simulated value is process-global.

use redoxmeter::adapters::hardware::HardwareAdapter;
use redoxmeter::app::controller::{CycleOutcome, RedoxController};
use redoxmeter::config::ControllerConfig;
use redoxmeter::drivers::pump::PumpDriver;
use redoxmeter::drivers::status_led::StatusLed;
use redoxmeter::error::SensorError;
use redoxmeter::pins;
use redoxmeter::sensors::redox::{SimRedoxAdc, sim_set_redox_raw};

use super::mock_hw::{EventLog, MockClock};

#[test]
fn simulated_probe_drives_pump_and_led() {
    let config = ControllerConfig::default();
    let mut hw = HardwareAdapter::new(
        SimRedoxAdc,
        PumpDriver::new(pins::PUMP_RELAY_GPIO),
        StatusLed::new(pins::STATUS_LED_GPIO),
    );
    let mut controller = RedoxController::new(config);
    let mut sink = EventLog::new();
    let mut clock = MockClock::at(0);
    controller.start(&mut hw, &mut sink);
    assert!(!hw.pump().is_running());
    assert!(hw.led().is_lit());

    // 0.1 V on the ±0.625 V span: below the 0.45 V setpoint.
    sim_set_redox_raw(9_730_784);
    clock.now = 5_001;
    assert_eq!(
        controller.poll(&mut hw, &mut clock, &mut sink),
        Some(CycleOutcome::RedoxOk)
    );
    // LED pin left HIGH after the measurement pulse.
    assert!(!hw.led().is_lit());

    // 0.6 V: above the setpoint.
    sim_set_redox_raw(16_441_669);
    clock.now = 10_002;
    assert_eq!(
        controller.poll(&mut hw, &mut clock, &mut sink),
        Some(CycleOutcome::PumpActivated)
    );
    assert!(!hw.pump().is_running());
    assert!(hw.led().is_lit());
    assert_eq!(controller.last_run_ms(), Some(12_002));

    // Negative simulated value: failed read, held off by default.
    sim_set_redox_raw(-1);
    clock.now = 20_000;
    assert_eq!(
        controller.poll(&mut hw, &mut clock, &mut sink),
        Some(CycleOutcome::SensorFault(SensorError::AdcReadFailed))
    );
    assert_eq!(controller.activation_count(), 1);
    assert_eq!(controller.fault_count(), 1);

    sim_set_redox_raw(0x80_0000);
}
