//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing each [`AppEvent`] to the `log`
//! facade at the event's own severity.  On target the ESP-IDF logger sends
//! it to UART / USB-CDC.

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        log::log!(event.level(), "{}", event);
    }
}
