//! GPIO / peripheral pin assignments for the redox meter board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Status LED (wired active-low: LOW = lit).
pub const STATUS_LED_GPIO: i32 = 9;
/// Pump relay driver input: HIGH = pump running.
pub const PUMP_RELAY_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// AD7124 on SPI2
// ---------------------------------------------------------------------------

/// Chip select (/SS) of the AD7124.
pub const ADC_CS_GPIO: i32 = 10;
pub const SPI_MOSI_GPIO: i32 = 11;
pub const SPI_SCLK_GPIO: i32 = 12;
pub const SPI_MISO_GPIO: i32 = 13;

/// AD7124 SPI clock.  The chip tolerates up to 5 MHz; 1 MHz keeps the
/// ribbon cable to the probe board quiet.
pub const ADC_SPI_FREQ_HZ: u32 = 1_000_000;
