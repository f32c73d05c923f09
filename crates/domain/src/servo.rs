//! Servo positioning.

use crate::address::ServoAddress;
use crate::command::{Command, check_wire_index};
use crate::error::EncodeError;

/// Full-scale servo value on the wire.
pub const SERVO_SCALE: f64 = 255.0;

/// Encode a servo move to `position` (`0.0..=1.0`).
///
/// # Errors
///
/// - [`EncodeError::PositionOutOfRange`] unless `0.0 <= position <= 1.0`
/// - [`EncodeError::SettingOutOfRange`] for a servo number wider than its
///   two-digit wire field
pub fn encode_position(servo: ServoAddress, position: f64) -> Result<Command, EncodeError> {
    if !(0.0..=1.0).contains(&position) {
        return Err(EncodeError::PositionOutOfRange(position));
    }
    check_wire_index("servo", servo.index)?;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let scaled = (position * SERVO_SCALE).round() as u8;
    Ok(Command::ServoPosition {
        servo,
        position: scaled,
    })
}
