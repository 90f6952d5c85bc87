//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ RedoxController (domain)
//! ```
//!
//! Driven adapters (ADC, GPIO, clock, log) implement these traits.  The
//! [`RedoxController`](super::controller::RedoxController) consumes them
//! via generics, so the control loop never touches hardware directly.

use embedded_hal::digital::PinState;

use crate::error::SensorError;

// ───────────────────────────────────────────────────────────────
// ADC port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: one blocking conversion, raw counts out.
pub trait AdcPort {
    /// Convert once on `channel`.  Blocks until the result is available
    /// or the converter gives up.
    fn read_raw(&mut self, channel: u8) -> Result<u32, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the two digital outputs.  Levels are electrical,
/// not logical: the status LED is wired active-low.
pub trait ActuatorPort {
    fn set_indicator(&mut self, level: PinState);

    fn set_pump(&mut self, level: PinState);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond counter.  Wraps at `u32::MAX` (~49.7 days);
/// callers compare timestamps with `wrapping_sub`.
///
/// Blocking waits go through [`embedded_hal::delay::DelayNs`], which
/// clock adapters implement alongside this trait.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The controller emits [`AppEvent`](super::events::AppEvent)s through
/// this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
