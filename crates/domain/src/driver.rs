//! Direct coil control outside of hardware rules.

use crate::address::CoilAddress;
use crate::command::{Command, check_wire_index};
use crate::error::EncodeError;
use crate::rule::{HoldSettings, PulseSettings};

/// Fire `coil` once.
///
/// # Errors
///
/// Returns [`EncodeError::SettingOutOfRange`] for a pulse over
/// [`MAX_PULSE_MS`](crate::rule::MAX_PULSE_MS), a power outside `0.0..=1.0`
/// or a coil index wider than its two-digit field.
pub fn pulse(coil: CoilAddress, pulse: PulseSettings) -> Result<Command, EncodeError> {
    check_wire_index("coil", coil.index)?;
    let (pulse_ms, power) = pulse.wire()?;
    Ok(Command::CoilPulse {
        coil,
        pulse_ms,
        power,
    })
}

/// Pulse `coil` and keep it held at `hold` until [`disable`].
///
/// # Errors
///
/// Same as [`pulse`], plus a hold power outside `0.0..=1.0`.
pub fn enable(
    coil: CoilAddress,
    pulse: PulseSettings,
    hold: HoldSettings,
) -> Result<Command, EncodeError> {
    check_wire_index("coil", coil.index)?;
    let (pulse_ms, pulse_power) = pulse.wire()?;
    let hold_power = hold.wire()?;
    Ok(Command::CoilEnable {
        coil,
        pulse_ms,
        pulse_power,
        hold_power,
    })
}

#[must_use]
pub fn disable(coil: CoilAddress) -> Command {
    Command::CoilDisable { coil }
}
