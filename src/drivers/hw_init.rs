//! One-shot hardware peripheral initialization.
//!
//! Configures the two GPIO outputs with raw ESP-IDF sys calls and brings
//! up the AD7124 on SPI2.  Called once from `main()` before the control
//! loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::config::AdcSettings;
#[cfg(target_os = "espidf")]
use crate::drivers::ad7124::Ad7124;
#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    SpiInitFailed(i32),
    AdcNotResponding,
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::SpiInitFailed(rc) => write!(f, "SPI2 init failed (rc={})", rc),
            Self::AdcNotResponding => write!(f, "AD7124 not responding"),
        }
    }
}

impl From<HwInitError> for crate::error::Error {
    fn from(e: HwInitError) -> Self {
        match e {
            HwInitError::GpioConfigFailed(_) => Self::Init("GPIO outputs"),
            HwInitError::SpiInitFailed(_) => Self::Init("SPI bus"),
            HwInitError::AdcNotResponding => Self::Init("AD7124"),
        }
    }
}

// ── GPIO Outputs ──────────────────────────────────────────────

/// `esp_err_t` value for success.
const ESP_OK_RC: i32 = 0;

/// Map an ESP-IDF GPIO return code to a result.
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
fn gpio_result(rc: i32) -> Result<(), HwInitError> {
    if rc == ESP_OK_RC {
        Ok(())
    } else {
        Err(HwInitError::GpioConfigFailed(rc))
    }
}

#[cfg(target_os = "espidf")]
pub fn init_gpio_outputs() -> Result<(), HwInitError> {
    let output_pins = [pins::STATUS_LED_GPIO, pins::PUMP_RELAY_GPIO];

    for &pin in &output_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        // SAFETY: called once from main() before the control loop; the
        // pins are not owned by any other driver.
        gpio_result(unsafe { gpio_config(&cfg) })?;
        // SAFETY: the pin was configured as an output just above.
        gpio_result(unsafe { gpio_set_level(pin, 0) })?;
    }

    info!("hw_init: GPIO outputs configured (led={}, pump={})", pins::STATUS_LED_GPIO, pins::PUMP_RELAY_GPIO);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_gpio_outputs() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): GPIO init skipped");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin;
    // pin was validated during init_gpio_outputs(). Main-loop only.
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── AD7124 on SPI2 ────────────────────────────────────────────

/// The converter as wired on the board.
#[cfg(target_os = "espidf")]
pub type RedoxAdc = Ad7124<
    esp_idf_hal::spi::SpiDeviceDriver<'static, esp_idf_hal::spi::SpiDriver<'static>>,
    esp_idf_hal::delay::FreeRtos,
>;

/// Bring up SPI2 (mode 3) and program the AD7124 for the redox probe.
#[cfg(target_os = "espidf")]
pub fn init_redox_adc(
    spi2: esp_idf_hal::spi::SPI2,
    settings: &AdcSettings,
) -> Result<RedoxAdc, HwInitError> {
    use esp_idf_hal::delay::FreeRtos;
    use esp_idf_hal::gpio::AnyIOPin;
    use esp_idf_hal::spi::{SpiConfig, SpiDeviceDriver, SpiDriver, SpiDriverConfig};
    use esp_idf_hal::units::Hertz;

    // SAFETY: pin numbers come from pins.rs and are claimed by nothing else.
    let (sclk, sdo, sdi, cs) = unsafe {
        (
            AnyIOPin::new(pins::SPI_SCLK_GPIO),
            AnyIOPin::new(pins::SPI_MOSI_GPIO),
            AnyIOPin::new(pins::SPI_MISO_GPIO),
            AnyIOPin::new(pins::ADC_CS_GPIO),
        )
    };

    let bus = SpiDriver::new(spi2, sclk, sdo, Some(sdi), &SpiDriverConfig::new())
        .map_err(|e| HwInitError::SpiInitFailed(e.code()))?;
    let device_cfg = SpiConfig::new()
        .baudrate(Hertz(pins::ADC_SPI_FREQ_HZ))
        .data_mode(embedded_hal::spi::MODE_3);
    let device = SpiDeviceDriver::new(bus, Some(cs), &device_cfg)
        .map_err(|e| HwInitError::SpiInitFailed(e.code()))?;

    let mut adc = Ad7124::new(device, FreeRtos);
    match adc.init(settings) {
        Ok(id) => {
            info!("hw_init: AD7124 ready (id=0x{:02x}, cs={})", id, pins::ADC_CS_GPIO);
            Ok(adc)
        }
        Err(e) => {
            log::error!("hw_init: AD7124 init failed: {}", e);
            Err(HwInitError::AdcNotResponding)
        }
    }
}
