//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements          | Connects to               |
//! |------------|---------------------|---------------------------|
//! | `hardware` | AdcPort             | AD7124 (or host sim)      |
//! |            | ActuatorPort        | LED + pump relay GPIO     |
//! | `log_sink` | EventSink           | Serial log output         |
//! | `time`     | Clock, DelayNs      | ESP32 system timer        |

pub mod hardware;
pub mod log_sink;
pub mod time;
