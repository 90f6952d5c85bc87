//! AD7124 Redoxmeter firmware entry point.
//!
//! Hexagonal architecture with a single blocking control loop.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                   │
//! │                                                          │
//! │  HardwareAdapter<RedoxAdc>   LogEventSink   Esp32Time    │
//! │  (Adc+Actuator)              (EventSink)    (Clock+Delay)│
//! │                                                          │
//! │  ─────────────── Port Trait Boundary ─────────────────   │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │          RedoxController (pure logic)              │  │
//! │  │   measure · threshold · cooldown · pump run        │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::info;

use esp_idf_hal::peripherals::Peripherals;

use redoxmeter::adapters::hardware::HardwareAdapter;
use redoxmeter::adapters::log_sink::LogEventSink;
use redoxmeter::adapters::time::Esp32TimeAdapter;
use redoxmeter::app::controller::RedoxController;
use redoxmeter::config::ControllerConfig;
use redoxmeter::drivers::hw_init;
use redoxmeter::drivers::pump::PumpDriver;
use redoxmeter::drivers::status_led::StatusLed;
use redoxmeter::error::Error;
use redoxmeter::pins;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("AD7124 Redoxmeter");
    info!("Startup...");

    // ── 2. Configuration ──────────────────────────────────────
    let config = ControllerConfig::default();
    config.validate()?;
    let dump = serde_json::to_string(&config).map_err(|e| anyhow::anyhow!("config dump: {e}"))?;
    info!("Config: {}", dump);

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;

    info!("Initializing AD7124...");
    let adc = hw_init::init_redox_adc(peripherals.spi2, &config.adc).map_err(Error::from)?;

    info!("Initializing Pins...");
    hw_init::init_gpio_outputs().map_err(Error::from)?;

    // ── 4. Adapters ───────────────────────────────────────────
    let mut hw = HardwareAdapter::new(
        adc,
        PumpDriver::new(pins::PUMP_RELAY_GPIO),
        StatusLed::new(pins::STATUS_LED_GPIO),
    );
    let mut sink = LogEventSink::new();
    let mut clock = Esp32TimeAdapter::new();

    // ── 5. Control loop ───────────────────────────────────────
    let mut controller = RedoxController::new(config);
    controller.start(&mut hw, &mut sink);

    info!("Startup complete, ready to redox!");

    controller.run(&mut hw, &mut clock, &mut sink)
}
