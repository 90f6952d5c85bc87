//! Sensor subsystem.
//!
//! A single probe: the redox electrode pair on the AD7124.

pub mod redox;
