//! Peripheral drivers and one-shot hardware initialisation.

pub mod ad7124;
pub mod hw_init;
pub mod pump;
pub mod status_led;
