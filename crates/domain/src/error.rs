//! Error types used across the workspace.
//!
//! Each concern defines its own typed error and converts into [`PkoneError`]
//! via `#[from]`. Callers branch on [`PkoneError::kind`] rather than on
//! message text.

use std::ops::RangeInclusive;

use crate::board::BoardFamily;

/// Top-level error type for the PKONE layer.
#[derive(Debug, thiserror::Error)]
pub enum PkoneError {
    #[error("board registration error")]
    Registry(#[from] RegistryError),

    #[error("invalid number")]
    Parse(#[from] ParseError),

    #[error("invalid switch/coil combination")]
    CrossBoard(#[from] CrossBoardError),

    #[error("cannot encode command")]
    Encode(#[from] EncodeError),

    #[error("cannot decode frame")]
    Frame(#[from] FrameError),

    /// An adapter-level failure (write to the link, closed stream, …).
    #[error("transport error")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Flat classification of every failure the layer can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DuplicateAddress,
    AddressOutOfRange,
    TooManyPoints,
    InvalidFormat,
    UnknownBoard,
    IndexOutOfRange,
    CrossBoardMismatch,
    UnsupportedHardwareFeature,
    MissingRuleField,
    SettingOutOfRange,
    PositionOutOfRange,
    MalformedFrame,
    Transport,
}

impl PkoneError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Registry(RegistryError::DuplicateAddress { .. }) => ErrorKind::DuplicateAddress,
            Self::Registry(RegistryError::AddressOutOfRange { .. }) => {
                ErrorKind::AddressOutOfRange
            }
            Self::Registry(RegistryError::TooManyPoints { .. }) => ErrorKind::TooManyPoints,
            Self::Parse(err) => err.kind(),
            Self::CrossBoard(_) => ErrorKind::CrossBoardMismatch,
            Self::Encode(err) => err.kind(),
            Self::Frame(FrameError::Malformed { .. }) => ErrorKind::MalformedFrame,
            Self::Frame(FrameError::UnknownBoard { .. }) => ErrorKind::UnknownBoard,
            Self::Transport(_) => ErrorKind::Transport,
        }
    }

    /// Whether the session may keep running after this error.
    ///
    /// Only inbound frame failures are recoverable; everything else is a
    /// configuration error that must abort the offending setup step.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Frame(_))
    }
}

/// Board registration failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate address id: a board has already been registered at address {address}")]
    DuplicateAddress { address: u8 },

    #[error("address out of range: {family} board address id must be between 0 and {max}, got {address}", max = .family.capacity() - 1)]
    AddressOutOfRange { family: BoardFamily, address: u8 },

    #[error("board {address} declares {count} {points}, at most 100 fit the wire numbering")]
    TooManyPoints {
        address: u8,
        points: &'static str,
        count: u16,
    },
}

/// What a `"<board>-<index>"` number was supposed to designate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoKind {
    Switch,
    Coil,
    Servo,
}

impl IoKind {
    fn plural(self) -> &'static str {
        match self {
            Self::Switch => "switches",
            Self::Coil => "coils",
            Self::Servo => "servos",
        }
    }
}

impl std::fmt::Display for IoKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Switch => f.write_str("switch"),
            Self::Coil => f.write_str("coil"),
            Self::Servo => f.write_str("servo"),
        }
    }
}

/// Failures while turning a `"<board>-<index>"` string into an address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid {kind} number {number:?}")]
    InvalidFormat { kind: IoKind, number: String },

    #[error("PKONE extension {board} does not exist for {kind} {number}")]
    UnknownBoard {
        kind: IoKind,
        board: u8,
        number: String,
    },

    /// `valid` holds the wire numbers accepted on that board, for diagnostics.
    #[error(
        "PKONE extension {board} only has {count} {plural} ({first} - {last}). {kind}: {number}",
        plural = .kind.plural(),
        first = .valid.start(),
        last = .valid.end(),
    )]
    IndexOutOfRange {
        kind: IoKind,
        board: u8,
        count: u8,
        valid: RangeInclusive<u32>,
        number: String,
    },
}

impl ParseError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidFormat { .. } => ErrorKind::InvalidFormat,
            Self::UnknownBoard { .. } => ErrorKind::UnknownBoard,
            Self::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
        }
    }
}

/// A switch and a coil that do not live on the same extension board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("driver {coil} and switch {switch} are on different boards, cannot apply rule")]
pub struct CrossBoardError {
    pub switch: String,
    pub coil: String,
}

/// Failures while building an outbound command.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodeError {
    #[error("{0} is not implemented in PKONE hardware")]
    UnsupportedHardwareFeature(&'static str),

    #[error("rule {rule} requires {field}")]
    MissingRuleField {
        rule: &'static str,
        field: &'static str,
    },

    #[error("{setting} must be within {min} - {max}, got {value}")]
    SettingOutOfRange {
        setting: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("position has to be between 0 and 1, got {0}")]
    PositionOutOfRange(f64),
}

impl EncodeError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedHardwareFeature(_) => ErrorKind::UnsupportedHardwareFeature,
            Self::MissingRuleField { .. } => ErrorKind::MissingRuleField,
            Self::SettingOutOfRange { .. } => ErrorKind::SettingOutOfRange,
            Self::PositionOutOfRange(_) => ErrorKind::PositionOutOfRange,
        }
    }
}

/// Failures while decoding an inbound frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("malformed frame {frame:?}: {reason}")]
    Malformed { frame: String, reason: &'static str },

    #[error("frame {frame:?} references unregistered extension board {board}")]
    UnknownBoard { frame: String, board: u8 },
}

impl FrameError {
    pub(crate) fn malformed(frame: &str, reason: &'static str) -> Self {
        Self::Malformed {
            frame: frame.to_string(),
            reason,
        }
    }
}
