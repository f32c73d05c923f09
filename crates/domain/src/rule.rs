//! Hardware rules — switch-triggered coil behaviour executed by the board.
//!
//! Rules are not tracked locally: [`encode`] turns one into a rule-set
//! command and [`clear`] unconditionally removes whatever is on a coil.

use serde::{Deserialize, Serialize};

use crate::address::{CoilAddress, SwitchAddress};
use crate::command::{Command, PowerLevel, check_wire_index};
use crate::error::EncodeError;

/// Longest pulse the board accepts, in milliseconds.
pub const MAX_PULSE_MS: u16 = 250;

/// Longest delay that fits the rule-set delay field.
pub const MAX_DELAY_MS: u32 = 9999;

/// The six switch → coil patterns, numbered 1–6 on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Pulse on hit; the pulse continues after release (pop bumpers).
    PulseOnHit,
    /// Pulse once the switch has been active for `delay_ms` (kickbacks).
    DelayedPulseOnHit,
    /// Pulse on hit, cancelled on release (main coil of dual-wound flippers
    /// without EOS).
    PulseOnHitAndRelease,
    /// Pulse then hold, cancelled and disabled on release (single coil
    /// flippers).
    PulseOnHitAndEnableAndRelease,
    /// Pulse, cancelled and disabled on release or on EOS hit (main coil of
    /// dual-wound flippers with EOS).
    PulseOnHitAndReleaseAndDisable,
    /// Pulse then hold, switching to hold on EOS hit (single-wound flippers
    /// with EOS). The board has no command for this one.
    PulseOnHitAndEnableAndReleaseAndDisable,
}

impl RuleKind {
    /// Wire number of the rule kind.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::PulseOnHit => 1,
            Self::DelayedPulseOnHit => 2,
            Self::PulseOnHitAndRelease => 3,
            Self::PulseOnHitAndEnableAndRelease => 4,
            Self::PulseOnHitAndReleaseAndDisable => 5,
            Self::PulseOnHitAndEnableAndReleaseAndDisable => 6,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::PulseOnHit => "pulse_on_hit",
            Self::DelayedPulseOnHit => "delayed_pulse_on_hit",
            Self::PulseOnHitAndRelease => "pulse_on_hit_and_release",
            Self::PulseOnHitAndEnableAndRelease => "pulse_on_hit_and_enable_and_release",
            Self::PulseOnHitAndReleaseAndDisable => "pulse_on_hit_and_release_and_disable",
            Self::PulseOnHitAndEnableAndReleaseAndDisable => {
                "pulse_on_hit_and_enable_and_release_and_disable"
            }
        }
    }

    fn needs_hold(self) -> bool {
        matches!(
            self,
            Self::PulseOnHitAndRelease
                | Self::PulseOnHitAndEnableAndRelease
                | Self::PulseOnHitAndReleaseAndDisable
        )
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Initial pulse of a coil.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PulseSettings {
    pub duration_ms: u16,
    /// Fraction of full power, `0.0..=1.0`.
    pub power: f64,
}

impl PulseSettings {
    pub(crate) fn wire(self) -> Result<(u8, PowerLevel), EncodeError> {
        let duration = u8::try_from(self.duration_ms)
            .ok()
            .filter(|ms| u16::from(*ms) <= MAX_PULSE_MS)
            .ok_or(EncodeError::SettingOutOfRange {
                setting: "pulse_ms",
                min: 0.0,
                max: f64::from(MAX_PULSE_MS),
                value: f64::from(self.duration_ms),
            })?;
        let power = PowerLevel::from_fraction("pulse_power", self.power)?;
        Ok((duration, power))
    }
}

/// Hold (PWM) level after the initial pulse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoldSettings {
    /// Fraction of full power, `0.0..=1.0`.
    pub power: f64,
}

impl HoldSettings {
    pub(crate) fn wire(self) -> Result<PowerLevel, EncodeError> {
        PowerLevel::from_fraction("hold_power", self.power)
    }
}

/// A switch → coil rule to install on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareRule {
    pub kind: RuleKind,
    pub coil: CoilAddress,
    pub enable_switch: SwitchAddress,
    pub eos_switch: Option<SwitchAddress>,
    pub delay_ms: u32,
    pub pulse: PulseSettings,
    pub hold: Option<HoldSettings>,
}

impl HardwareRule {
    #[must_use]
    pub fn pulse_on_hit(coil: CoilAddress, enable: SwitchAddress, pulse: PulseSettings) -> Self {
        Self::new(RuleKind::PulseOnHit, coil, enable, pulse)
    }

    #[must_use]
    pub fn delayed_pulse_on_hit(
        coil: CoilAddress,
        enable: SwitchAddress,
        delay_ms: u32,
        pulse: PulseSettings,
    ) -> Self {
        Self {
            delay_ms,
            ..Self::new(RuleKind::DelayedPulseOnHit, coil, enable, pulse)
        }
    }

    #[must_use]
    pub fn pulse_on_hit_and_release(
        coil: CoilAddress,
        enable: SwitchAddress,
        pulse: PulseSettings,
        hold: HoldSettings,
    ) -> Self {
        Self {
            hold: Some(hold),
            ..Self::new(RuleKind::PulseOnHitAndRelease, coil, enable, pulse)
        }
    }

    #[must_use]
    pub fn pulse_on_hit_and_enable_and_release(
        coil: CoilAddress,
        enable: SwitchAddress,
        pulse: PulseSettings,
        hold: HoldSettings,
    ) -> Self {
        Self {
            hold: Some(hold),
            ..Self::new(RuleKind::PulseOnHitAndEnableAndRelease, coil, enable, pulse)
        }
    }

    #[must_use]
    pub fn pulse_on_hit_and_release_and_disable(
        coil: CoilAddress,
        enable: SwitchAddress,
        eos: SwitchAddress,
        pulse: PulseSettings,
        hold: HoldSettings,
    ) -> Self {
        Self {
            eos_switch: Some(eos),
            hold: Some(hold),
            ..Self::new(RuleKind::PulseOnHitAndReleaseAndDisable, coil, enable, pulse)
        }
    }

    #[must_use]
    pub fn pulse_on_hit_and_enable_and_release_and_disable(
        coil: CoilAddress,
        enable: SwitchAddress,
        eos: SwitchAddress,
        pulse: PulseSettings,
        hold: HoldSettings,
    ) -> Self {
        Self {
            eos_switch: Some(eos),
            hold: Some(hold),
            ..Self::new(
                RuleKind::PulseOnHitAndEnableAndReleaseAndDisable,
                coil,
                enable,
                pulse,
            )
        }
    }

    fn new(
        kind: RuleKind,
        coil: CoilAddress,
        enable_switch: SwitchAddress,
        pulse: PulseSettings,
    ) -> Self {
        Self {
            kind,
            coil,
            enable_switch,
            eos_switch: None,
            delay_ms: 0,
            pulse,
            hold: None,
        }
    }
}

/// Encode a rule as a rule-set command.
///
/// # Errors
///
/// - [`EncodeError::UnsupportedHardwareFeature`] for
///   [`RuleKind::PulseOnHitAndEnableAndReleaseAndDisable`], whatever the
///   other fields hold
/// - [`EncodeError::MissingRuleField`] when the kind needs a hold setting or
///   an EOS switch that is absent
/// - [`EncodeError::SettingOutOfRange`] for a pulse over
///   [`MAX_PULSE_MS`], a delay over [`MAX_DELAY_MS`] or a power outside
///   `0.0..=1.0`, or for a coil or switch index wider than its two-digit
///   field
pub fn encode(rule: &HardwareRule) -> Result<Command, EncodeError> {
    let kind = rule.kind;
    if kind == RuleKind::PulseOnHitAndEnableAndReleaseAndDisable {
        return Err(EncodeError::UnsupportedHardwareFeature(
            "single-wound coils with EOS",
        ));
    }

    let missing = |field| EncodeError::MissingRuleField {
        rule: kind.name(),
        field,
    };

    let eos_switch = match (kind, rule.eos_switch) {
        (RuleKind::PulseOnHitAndReleaseAndDisable, None) => return Err(missing("eos_switch")),
        (RuleKind::PulseOnHitAndReleaseAndDisable, Some(eos)) => Some(eos),
        _ => None,
    };

    let hold_power = match rule.hold {
        Some(hold) if kind.needs_hold() => hold.wire()?,
        None if kind.needs_hold() => return Err(missing("hold")),
        _ => PowerLevel::default(),
    };

    let delay_ms = u16::try_from(rule.delay_ms)
        .ok()
        .filter(|ms| u32::from(*ms) <= MAX_DELAY_MS)
        .ok_or(EncodeError::SettingOutOfRange {
            setting: "delay_ms",
            min: 0.0,
            max: f64::from(MAX_DELAY_MS),
            value: f64::from(rule.delay_ms),
        })?;
    let (pulse_ms, pulse_power) = rule.pulse.wire()?;

    check_wire_index("coil", rule.coil.index)?;
    check_wire_index("enable_switch", rule.enable_switch.index)?;
    if let Some(eos) = eos_switch {
        check_wire_index("eos_switch", eos.index)?;
    }

    Ok(Command::RuleSet {
        coil: rule.coil,
        kind: kind.code(),
        enable_switch: rule.enable_switch,
        eos_switch,
        delay_ms,
        pulse_ms,
        pulse_power,
        hold_power,
    })
}

/// Rule-clear command for a coil, whatever rule it carries.
#[must_use]
pub fn clear(coil: CoilAddress) -> Command {
    Command::RuleClear { coil }
}
