//! Threshold and cooldown decision.
//!
//! Pure functions over the latest voltage and the controller's timestamps.
//! Time is a wrapping `u32` millisecond counter, so every elapsed-time
//! computation goes through [`elapsed_ms`].

/// What the control loop should do with one reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Reading is too low and the pump may run.
    ActivatePump,
    /// Reading is too low but the pump ran less than a cooldown ago.
    CoolingDown { remaining_ms: u32 },
    /// Nothing to do.
    RedoxOk,
}

/// "Redox too low" predicate of the dosing loop.
///
/// True when the probe voltage is strictly **above** the setpoint.
/// Equal counts as fine.
pub fn is_redox_too_low(volts: f32, setpoint_volts: f32) -> bool {
    volts > setpoint_volts
}

/// Milliseconds from `since` to `now`, correct across one counter wrap.
pub fn elapsed_ms(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

/// Combine the threshold with the pump cooldown.
///
/// `last_run_ms == None` means the pump has never run, which always
/// allows an activation.
pub fn decide(
    volts: f32,
    setpoint_volts: f32,
    now_ms: u32,
    last_run_ms: Option<u32>,
    cooldown_ms: u32,
) -> Decision {
    if !is_redox_too_low(volts, setpoint_volts) {
        return Decision::RedoxOk;
    }
    match last_run_ms {
        None => Decision::ActivatePump,
        Some(last) => {
            let elapsed = elapsed_ms(now_ms, last);
            if elapsed >= cooldown_ms {
                Decision::ActivatePump
            } else {
                Decision::CoolingDown {
                    remaining_ms: cooldown_ms - elapsed,
                }
            }
        }
    }
}
