//! Outbound wire commands.
//!
//! Every command renders (via [`Display`](std::fmt::Display)) to fixed-width
//! ASCII: a 3-letter opcode, zero-padded decimal fields and the `E`
//! terminator. There is no length prefix.
//!
//! | Command | Layout |
//! |---------|--------|
//! | heartbeat | `PWD` |
//! | reset | `PRS` |
//! | rule-set | `PHR` b cc k sb ss f eb ee dddd ppp P H |
//! | rule-clear | `PHD` b cc |
//! | servo-position | `PSC` b nn vvv |
//! | coil pulse | `PCP` b cc ppp P |
//! | coil enable | `PCE` b cc ppp P H |
//! | coil disable | `PCD` b cc |
//!
//! `b` board, `cc` coil, `k` rule kind, `sb`/`ss` enable switch board and
//! index, `f` EOS present flag, `eb`/`ee` EOS switch board and index, `dddd`
//! delay ms, `ppp` pulse ms, `P`/`H` pulse and hold power in eighths, `nn`
//! servo wire number, `vvv` servo position.

use std::fmt;

use crate::address::{CoilAddress, ServoAddress, SwitchAddress};
use crate::error::EncodeError;

/// Terminator closing every frame in both directions.
pub const TERMINATOR: char = 'E';

/// Highest switch, coil or servo number that fits a two-digit field.
pub const MAX_WIRE_INDEX: u8 = 99;

/// Reject an index that would widen its two-digit wire field.
pub(crate) fn check_wire_index(setting: &'static str, index: u8) -> Result<(), EncodeError> {
    if index > MAX_WIRE_INDEX {
        return Err(EncodeError::SettingOutOfRange {
            setting,
            min: 0.0,
            max: f64::from(MAX_WIRE_INDEX),
            value: f64::from(index),
        });
    }
    Ok(())
}

/// A power fraction quantised to eighths (`0..=8`), one wire digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PowerLevel(u8);

impl PowerLevel {
    pub const MAX: Self = Self(8);

    /// Quantise a power fraction.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::SettingOutOfRange`] unless `0.0 <= power <= 1.0`.
    pub fn from_fraction(setting: &'static str, power: f64) -> Result<Self, EncodeError> {
        if !(0.0..=1.0).contains(&power) {
            return Err(EncodeError::SettingOutOfRange {
                setting,
                min: 0.0,
                max: 1.0,
                value: power,
            });
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let eighths = (power * 8.0).round() as u8;
        Ok(Self(eighths))
    }

    #[must_use]
    pub fn eighths(self) -> u8 {
        self.0
    }
}

/// A command sent from the host to the PKONE controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Liveness signal; the board disables outputs after 1 s without one.
    Heartbeat,
    /// Disable all outputs.
    Reset,
    /// Install a hardware rule on a coil.
    RuleSet {
        coil: CoilAddress,
        kind: u8,
        enable_switch: SwitchAddress,
        eos_switch: Option<SwitchAddress>,
        delay_ms: u16,
        pulse_ms: u8,
        pulse_power: PowerLevel,
        hold_power: PowerLevel,
    },
    /// Remove whatever rule is installed on a coil.
    RuleClear { coil: CoilAddress },
    /// Move a servo; `position` is `0..=255`. The servo goes out under its
    /// wire number.
    ServoPosition { servo: ServoAddress, position: u8 },
    /// Fire a coil once.
    CoilPulse {
        coil: CoilAddress,
        pulse_ms: u8,
        power: PowerLevel,
    },
    /// Pulse a coil then keep it held.
    CoilEnable {
        coil: CoilAddress,
        pulse_ms: u8,
        pulse_power: PowerLevel,
        hold_power: PowerLevel,
    },
    /// Release a held coil.
    CoilDisable { coil: CoilAddress },
}

impl Command {
    #[must_use]
    pub fn opcode(&self) -> &'static str {
        match self {
            Self::Heartbeat => "PWD",
            Self::Reset => "PRS",
            Self::RuleSet { .. } => "PHR",
            Self::RuleClear { .. } => "PHD",
            Self::ServoPosition { .. } => "PSC",
            Self::CoilPulse { .. } => "PCP",
            Self::CoilEnable { .. } => "PCE",
            Self::CoilDisable { .. } => "PCD",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.opcode())?;
        match self {
            Self::Heartbeat | Self::Reset => {}
            Self::RuleSet {
                coil,
                kind,
                enable_switch,
                eos_switch,
                delay_ms,
                pulse_ms,
                pulse_power,
                hold_power,
            } => {
                let (eos_flag, eos) = eos_switch
                    .map_or((0, SwitchAddress::new(0, 0)), |eos| (1, eos));
                write!(
                    f,
                    "{}{:02}{kind}{}{:02}{eos_flag}{}{:02}{delay_ms:04}{pulse_ms:03}{}{}",
                    coil.board_id,
                    coil.index,
                    enable_switch.board_id,
                    enable_switch.index,
                    eos.board_id,
                    eos.index,
                    pulse_power.eighths(),
                    hold_power.eighths(),
                )?;
            }
            Self::RuleClear { coil } | Self::CoilDisable { coil } => {
                write!(f, "{}{:02}", coil.board_id, coil.index)?;
            }
            Self::ServoPosition { servo, position } => {
                write!(f, "{}{:02}{position:03}", servo.board_id, servo.index)?;
            }
            Self::CoilPulse {
                coil,
                pulse_ms,
                power,
            } => {
                write!(
                    f,
                    "{}{:02}{pulse_ms:03}{}",
                    coil.board_id,
                    coil.index,
                    power.eighths()
                )?;
            }
            Self::CoilEnable {
                coil,
                pulse_ms,
                pulse_power,
                hold_power,
            } => {
                write!(
                    f,
                    "{}{:02}{pulse_ms:03}{}{}",
                    coil.board_id,
                    coil.index,
                    pulse_power.eighths(),
                    hold_power.eighths()
                )?;
            }
        }
        write!(f, "{TERMINATOR}")
    }
}
