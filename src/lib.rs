//! AD7124 redox meter firmware library.
//!
//! Exposes the control core and its adapters for integration testing.
//! All ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod pins;

// The adapter/driver/sensor modules carry a host simulation next to the
// target code, so the crate builds and tests off-target.
pub mod adapters;
pub mod drivers;
pub mod sensors;
