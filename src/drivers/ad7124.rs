//! Analog Devices AD7124 24-bit sigma-delta ADC driver.
//!
//! Only the register subset the redox front-end needs: reset, identity,
//! one setup slot, one channel, ADC control, bias pins and blocking
//! single conversions.  Generic over any `embedded_hal` [`SpiDevice`]
//! (SPI mode 3, chip select owned by the device) and a [`DelayNs`] used
//! while polling for end of conversion.
//!
//! ## Conversion times (single conversion, default filter)
//!
//! | Power mode | Tconv  |
//! |------------|--------|
//! | Low        | 652 ms |
//! | Mid        | 330 ms |
//! | Full       |  90 ms |

use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::{Operation, SpiDevice};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::AdcPort;
use crate::config::AdcSettings;
use crate::error::SensorError;

// ── Register map ──────────────────────────────────────────────

const REG_STATUS: u8 = 0x00;
const REG_ADC_CONTROL: u8 = 0x01;
const REG_DATA: u8 = 0x02;
const REG_IO_CONTROL_2: u8 = 0x04;
const REG_ID: u8 = 0x05;
const REG_CHANNEL_0: u8 = 0x09;
const REG_CONFIG_0: u8 = 0x19;

/// Communications register: R/W bit.  The low six bits carry the address.
const COMMS_READ: u8 = 0x40;
const COMMS_ADDR_MASK: u8 = 0x3F;

/// STATUS.RDY is active low.
const STATUS_RDY_N: u32 = 0x80;

const ADC_CTRL_REF_EN: u16 = 1 << 8;
const CH_ENABLE: u16 = 1 << 15;
const CFG_BIPOLAR: u16 = 1 << 11;
/// AIN_BUFP | AIN_BUFM, enabled out of reset.
const CFG_AIN_BUFFERS: u16 = 0b11 << 5;

/// Reset value of CHANNEL_n without the enable bit (AINP = AIN0, AINM = AIN1).
const CHANNEL_RESET: u16 = 0x0001;

const FULL_SCALE_UNIPOLAR: f64 = 0xFF_FFFF as f64;
const HALF_SCALE_BIPOLAR: f64 = 0x7F_FFFF as f64;

/// Longest single conversion (low power, 652 ms) plus margin.
const CONVERSION_TIMEOUT_MS: u32 = 1_000;

// ── Setup enums ───────────────────────────────────────────────

/// Programmable gain amplifier setting (CONFIG_n.PGA).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gain {
    X1 = 0,
    X2 = 1,
    X4 = 2,
    X8 = 3,
    X16 = 4,
    X32 = 5,
    X64 = 6,
    X128 = 7,
}

impl Gain {
    /// Amplification factor.
    pub const fn factor(self) -> u8 {
        1 << (self as u8)
    }
}

/// Reference source (CONFIG_n.REF_SEL).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reference {
    RefIn1 = 0,
    RefIn2 = 1,
    /// Internal 2.5 V reference.  Needs ADC_CONTROL.REF_EN.
    Internal = 2,
    Avdd = 3,
}

/// ADC_CONTROL.POWER_MODE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerMode {
    Low = 0,
    Mid = 1,
    Full = 2,
}

/// ADC_CONTROL.MODE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingMode {
    Continuous = 0,
    SingleConversion = 1,
    Standby = 2,
    PowerDown = 3,
    Idle = 4,
}

// ── Errors ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ad7124Error<E> {
    /// The underlying SPI transfer failed.
    Spi(E),
    /// RDY never went low within [`CONVERSION_TIMEOUT_MS`].
    Timeout,
    /// ID register read back as all-zeros / all-ones: nothing on the bus.
    NoDevice(u8),
}

impl<E: fmt::Debug> fmt::Display for Ad7124Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spi(e) => write!(f, "SPI error: {e:?}"),
            Self::Timeout => write!(f, "conversion timed out"),
            Self::NoDevice(id) => write!(f, "no AD7124 on the bus (id=0x{id:02x})"),
        }
    }
}

impl<E> From<Ad7124Error<E>> for SensorError {
    fn from(e: Ad7124Error<E>) -> Self {
        match e {
            Ad7124Error::Timeout => Self::ConversionTimeout,
            Ad7124Error::Spi(_) | Ad7124Error::NoDevice(_) => Self::AdcReadFailed,
        }
    }
}

// ── Pure conversion ───────────────────────────────────────────

/// Convert a 24-bit conversion result to volts at the ADC input.
///
/// Bipolar coding is offset binary: `0x800000` is 0 V, `0x000000` is
/// `-vref/gain`, `0xFFFFFF` is `+vref/gain`.
pub fn counts_to_volts(raw: u32, gain: u8, vref: f32, bipolar: bool) -> f32 {
    let raw = f64::from(raw);
    let normalised = if bipolar {
        raw / HALF_SCALE_BIPOLAR - 1.0
    } else {
        raw / FULL_SCALE_UNIPOLAR
    };
    (normalised * f64::from(vref) / f64::from(gain)) as f32
}

// ── Driver ────────────────────────────────────────────────────

pub struct Ad7124<SPI, D> {
    spi: SPI,
    delay: D,
    /// Shadow of ADC_CONTROL; mode changes keep power/reference bits.
    adc_control: u16,
    /// Shadow of CHANNEL_n without the enable bit.
    channels: [u16; 16],
}

impl<SPI, D> Ad7124<SPI, D>
where
    SPI: SpiDevice,
    D: DelayNs,
{
    pub fn new(spi: SPI, delay: D) -> Self {
        Self {
            spi,
            delay,
            adc_control: 0,
            channels: [CHANNEL_RESET; 16],
        }
    }

    /// Reset the chip and program it for the redox front-end.
    ///
    /// Returns the ID register value.
    pub fn init(&mut self, settings: &AdcSettings) -> Result<u8, Ad7124Error<SPI::Error>> {
        self.reset()?;

        let id = self.read_id()?;
        if id == 0x00 || id == 0xFF {
            return Err(Ad7124Error::NoDevice(id));
        }
        debug!("AD7124: id=0x{:02x}", id);

        self.set_config(settings.setup, settings.reference, settings.gain, settings.bipolar)?;
        self.set_channel(
            settings.channel,
            settings.setup,
            settings.positive_input,
            settings.negative_input,
        )?;
        self.set_adc_control(
            OperatingMode::Standby,
            settings.power_mode,
            settings.reference == Reference::Internal,
        )?;
        self.set_bias_pins(settings.bias_pins)?;
        Ok(id)
    }

    /// Serial interface reset: 64 consecutive ones.
    pub fn reset(&mut self) -> Result<(), Ad7124Error<SPI::Error>> {
        self.spi.write(&[0xFF; 8]).map_err(Ad7124Error::Spi)?;
        self.adc_control = 0;
        self.channels = [CHANNEL_RESET; 16];
        // Power-on reset of the register file takes ~90 µs.
        self.delay.delay_ms(1);
        Ok(())
    }

    pub fn read_id(&mut self) -> Result<u8, Ad7124Error<SPI::Error>> {
        Ok(self.read_register(REG_ID, 1)? as u8)
    }

    /// Program setup slot `setup` (CONFIG_n).  Input buffers stay enabled.
    pub fn set_config(
        &mut self,
        setup: u8,
        reference: Reference,
        gain: Gain,
        bipolar: bool,
    ) -> Result<(), Ad7124Error<SPI::Error>> {
        let mut value = CFG_AIN_BUFFERS | ((reference as u16) << 3) | gain as u16;
        if bipolar {
            value |= CFG_BIPOLAR;
        }
        self.write_register(REG_CONFIG_0 + (setup & 0x07), u32::from(value), 2)
    }

    /// Map `channel` to an input pair and setup slot.  The channel stays
    /// disabled until [`read`](Self::read) converts on it.
    pub fn set_channel(
        &mut self,
        channel: u8,
        setup: u8,
        ainp: u8,
        ainm: u8,
    ) -> Result<(), Ad7124Error<SPI::Error>> {
        let ch = usize::from(channel & 0x0F);
        self.channels[ch] =
            (u16::from(setup & 0x07) << 12) | (u16::from(ainp & 0x1F) << 5) | u16::from(ainm & 0x1F);
        self.enable_channel(channel, false)
    }

    pub fn set_adc_control(
        &mut self,
        mode: OperatingMode,
        power: PowerMode,
        ref_enable: bool,
    ) -> Result<(), Ad7124Error<SPI::Error>> {
        let mut value = ((power as u16) << 6) | ((mode as u16) << 2);
        if ref_enable {
            value |= ADC_CTRL_REF_EN;
        }
        self.write_register(REG_ADC_CONTROL, u32::from(value), 2)?;
        self.adc_control = value;
        Ok(())
    }

    /// Route AVDD/2 to the inputs set in `mask` (IO_CONTROL_2).
    pub fn set_bias_pins(&mut self, mask: u16) -> Result<(), Ad7124Error<SPI::Error>> {
        self.write_register(REG_IO_CONTROL_2, u32::from(mask), 2)
    }

    /// One blocking single conversion on `channel`.  Returns the raw
    /// 24-bit result.
    pub fn read(&mut self, channel: u8) -> Result<u32, Ad7124Error<SPI::Error>> {
        self.enable_channel(channel, true)?;
        self.set_mode(OperatingMode::SingleConversion)?;

        let outcome = self
            .wait_end_of_conversion()
            .and_then(|()| self.read_register(REG_DATA, 3));

        // The chip drops back to standby by itself after a single conversion.
        self.enable_channel(channel, false)?;
        outcome
    }

    /// Give back the bus and delay provider.
    pub fn release(self) -> (SPI, D) {
        (self.spi, self.delay)
    }

    // ── Internal ──────────────────────────────────────────────

    fn set_mode(&mut self, mode: OperatingMode) -> Result<(), Ad7124Error<SPI::Error>> {
        let value = (self.adc_control & !(0x0F << 2)) | ((mode as u16) << 2);
        self.write_register(REG_ADC_CONTROL, u32::from(value), 2)?;
        self.adc_control = value;
        Ok(())
    }

    fn enable_channel(&mut self, channel: u8, enable: bool) -> Result<(), Ad7124Error<SPI::Error>> {
        let ch = channel & 0x0F;
        let mut value = self.channels[usize::from(ch)];
        if enable {
            value |= CH_ENABLE;
        }
        self.write_register(REG_CHANNEL_0 + ch, u32::from(value), 2)
    }

    fn wait_end_of_conversion(&mut self) -> Result<(), Ad7124Error<SPI::Error>> {
        for _ in 0..CONVERSION_TIMEOUT_MS {
            if self.read_register(REG_STATUS, 1)? & STATUS_RDY_N == 0 {
                return Ok(());
            }
            self.delay.delay_ms(1);
        }
        Err(Ad7124Error::Timeout)
    }

    fn write_register(&mut self, reg: u8, value: u32, len: usize) -> Result<(), Ad7124Error<SPI::Error>> {
        let mut frame = [0u8; 4];
        frame[0] = reg & COMMS_ADDR_MASK;
        frame[1..=len].copy_from_slice(&value.to_be_bytes()[4 - len..]);
        self.spi.write(&frame[..=len]).map_err(Ad7124Error::Spi)
    }

    fn read_register(&mut self, reg: u8, len: usize) -> Result<u32, Ad7124Error<SPI::Error>> {
        let mut buf = [0u8; 3];
        self.spi
            .transaction(&mut [
                Operation::Write(&[COMMS_READ | (reg & COMMS_ADDR_MASK)]),
                Operation::Read(&mut buf[..len]),
            ])
            .map_err(Ad7124Error::Spi)?;
        Ok(buf[..len].iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b)))
    }
}

impl<SPI, D> AdcPort for Ad7124<SPI, D>
where
    SPI: SpiDevice,
    D: DelayNs,
{
    fn read_raw(&mut self, channel: u8) -> Result<u32, SensorError> {
        self.read(channel).map_err(|e| {
            warn!("AD7124: read on channel {} failed: {}", channel, e);
            SensorError::from(e)
        })
    }
}
