//! Inbound frame decoding.
//!
//! Pure functions over `&str` frames, checked against the registry. A
//! malformed frame is rejected whole; nothing is partially applied.
//!
//! | Frame | Layout |
//! |-------|--------|
//! | switch snapshot | `PSA` (b s s … `X`)+ `E` |
//! | switch change | `PSW` b ii s `E` |
//!
//! `b` board digit, `s` state (`0` inactive, `1` active), `ii` zero-based
//! switch index on that board.

use crate::address::SwitchAddress;
use crate::board::ExpansionBoard;
use crate::command::TERMINATOR;
use crate::error::FrameError;
use crate::registry::BoardRegistry;
use crate::switch_state::{SwitchSnapshot, SwitchStateEvent};

pub const SNAPSHOT_OPCODE: &str = "PSA";
pub const CHANGE_OPCODE: &str = "PSW";

/// Separator between per-board segments of a snapshot.
pub const SEGMENT_DELIMITER: char = 'X';

const CHANGE_LEN: usize = 8;

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    Snapshot(SwitchSnapshot),
    Change(SwitchStateEvent),
}

/// Decode any supported frame by its opcode.
///
/// # Errors
///
/// Returns [`FrameError::Malformed`] for an unknown opcode, and whatever the
/// specific decoder reports otherwise.
pub fn decode_frame(frame: &str, registry: &BoardRegistry) -> Result<InboundFrame, FrameError> {
    match frame.get(..3) {
        Some(SNAPSHOT_OPCODE) => decode_snapshot(frame, registry).map(InboundFrame::Snapshot),
        Some(CHANGE_OPCODE) => decode_change(frame, registry).map(InboundFrame::Change),
        _ => Err(FrameError::malformed(frame, "unknown opcode")),
    }
}

/// Decode a full `PSA…E` snapshot frame.
///
/// # Errors
///
/// See [`decode_snapshot_payload`]; additionally [`FrameError::Malformed`]
/// when the opcode or terminator is missing.
pub fn decode_snapshot(frame: &str, registry: &BoardRegistry) -> Result<SwitchSnapshot, FrameError> {
    let payload = frame
        .strip_prefix(SNAPSHOT_OPCODE)
        .and_then(|rest| rest.strip_suffix(TERMINATOR))
        .ok_or_else(|| FrameError::malformed(frame, "expected PSA…E"))?;
    decode_snapshot_payload(payload, registry).map_err(|err| with_frame(err, frame))
}

/// Decode the segments of a snapshot, without opcode and terminator.
///
/// Each segment is one board digit followed by one state character per
/// switch, in index order. Empty segments (such as after a trailing
/// delimiter) are skipped.
///
/// # Errors
///
/// - [`FrameError::UnknownBoard`] when a segment names a board that is not
///   registered (for instance before discovery has completed)
/// - [`FrameError::Malformed`] for a non-digit board, a state other than
///   `0`/`1`, more states than the board has switches, or a board repeated
///   within the same snapshot
pub fn decode_snapshot_payload(
    payload: &str,
    registry: &BoardRegistry,
) -> Result<SwitchSnapshot, FrameError> {
    let mut snapshot = SwitchSnapshot::new();
    let mut seen = Vec::new();

    for segment in payload.split(SEGMENT_DELIMITER).filter(|s| !s.is_empty()) {
        let mut chars = segment.chars();
        let board_id = chars
            .next()
            .and_then(digit)
            .ok_or_else(|| FrameError::malformed(payload, "segment must start with a board digit"))?;
        if seen.contains(&board_id) {
            return Err(FrameError::malformed(payload, "board reported twice"));
        }
        seen.push(board_id);

        let board = lookup(payload, board_id, registry)?;
        let states = chars.as_str();
        if states.len() > usize::from(board.switch_count) {
            return Err(FrameError::malformed(
                payload,
                "more switch states than the board has switches",
            ));
        }

        for (index, state) in states.chars().enumerate() {
            let index = u8::try_from(index)
                .map_err(|_| FrameError::malformed(payload, "too many switch states"))?;
            let active = state_flag(state)
                .ok_or_else(|| FrameError::malformed(payload, "switch state must be 0 or 1"))?;
            snapshot.set(SwitchAddress::new(board_id, index), active);
        }
    }

    Ok(snapshot)
}

/// Decode a `PSW b ii s E` single-change frame.
///
/// # Errors
///
/// - [`FrameError::Malformed`] on wrong length, opcode or terminator, a
///   non-digit field, a state other than `0`/`1`, or an index beyond the
///   board's switches
/// - [`FrameError::UnknownBoard`] when the board is not registered
pub fn decode_change(frame: &str, registry: &BoardRegistry) -> Result<SwitchStateEvent, FrameError> {
    if frame.len() != CHANGE_LEN || !frame.is_ascii() {
        return Err(FrameError::malformed(frame, "switch change must be 8 characters"));
    }
    let fields = frame
        .strip_prefix(CHANGE_OPCODE)
        .and_then(|rest| rest.strip_suffix(TERMINATOR))
        .ok_or_else(|| FrameError::malformed(frame, "expected PSW…E"))?;

    let bytes = fields.as_bytes();
    let board_id = digit(char::from(bytes[0]))
        .ok_or_else(|| FrameError::malformed(frame, "board must be a digit"))?;
    let index = fields[1..3]
        .bytes()
        .try_fold(0u8, |acc, b| digit(char::from(b)).map(|d| acc * 10 + d))
        .ok_or_else(|| FrameError::malformed(frame, "switch index must be two digits"))?;
    let active = state_flag(char::from(bytes[3]))
        .ok_or_else(|| FrameError::malformed(frame, "switch state must be 0 or 1"))?;

    let board = lookup(frame, board_id, registry)?;
    if index >= board.switch_count {
        return Err(FrameError::malformed(frame, "switch index beyond the board's switches"));
    }

    Ok(SwitchStateEvent {
        address: SwitchAddress::new(board_id, index),
        active,
    })
}

fn lookup<'r>(
    frame: &str,
    board_id: u8,
    registry: &'r BoardRegistry,
) -> Result<&'r ExpansionBoard, FrameError> {
    registry
        .extension(board_id)
        .ok_or_else(|| FrameError::UnknownBoard {
            frame: frame.to_string(),
            board: board_id,
        })
}

/// Report errors against the whole frame rather than the stripped payload.
fn with_frame(err: FrameError, frame: &str) -> FrameError {
    match err {
        FrameError::Malformed { reason, .. } => FrameError::malformed(frame, reason),
        FrameError::UnknownBoard { board, .. } => FrameError::UnknownBoard {
            frame: frame.to_string(),
            board,
        },
    }
}

fn digit(c: char) -> Option<u8> {
    c.to_digit(10).and_then(|d| u8::try_from(d).ok())
}

fn state_flag(c: char) -> Option<bool> {
    match c {
        '0' => Some(false),
        '1' => Some(true),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> BoardRegistry {
        let mut registry = BoardRegistry::new();
        registry
            .register_extension(ExpansionBoard::builder(1).coils(2).switches(2).build())
            .unwrap();
        registry
            .register_extension(ExpansionBoard::builder(2).coils(2).switches(12).build())
            .unwrap();
        registry
    }

    #[test]
    fn should_decode_two_board_snapshot() {
        let snapshot = decode_snapshot_payload("111X210X", &registry()).unwrap();
        let map = snapshot.to_number_map();
        assert_eq!(map.len(), 4);
        assert!(map["1-0"]);
        assert!(map["1-1"]);
        assert!(map["2-0"]);
        assert!(!map["2-1"]);
    }

    #[test]
    fn should_decode_snapshot_frame_without_trailing_delimiter() {
        let snapshot = decode_snapshot("PSA101X20001E", &registry()).unwrap();
        assert_eq!(snapshot.get(SwitchAddress::new(1, 0)), Some(false));
        assert_eq!(snapshot.get(SwitchAddress::new(1, 1)), Some(true));
        assert_eq!(snapshot.get(SwitchAddress::new(2, 3)), Some(true));
        assert_eq!(snapshot.len(), 6);
    }

    #[test]
    fn should_decode_empty_snapshot() {
        let snapshot = decode_snapshot("PSAE", &registry()).unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn should_report_unknown_board_in_snapshot() {
        let err = decode_snapshot("PSA11X301E", &registry()).unwrap_err();
        assert_eq!(
            err,
            FrameError::UnknownBoard {
                frame: "PSA11X301E".to_string(),
                board: 3,
            }
        );
    }

    #[test]
    fn should_reject_snapshot_with_non_binary_state() {
        let err = decode_snapshot_payload("11AX", &registry()).unwrap_err();
        assert!(matches!(err, FrameError::Malformed { .. }));
    }

    #[test]
    fn should_reject_snapshot_with_more_states_than_switches() {
        let err = decode_snapshot_payload("1101", &registry()).unwrap_err();
        assert!(matches!(err, FrameError::Malformed { .. }));
    }

    #[test]
    fn should_reject_snapshot_with_repeated_board() {
        let err = decode_snapshot_payload("11X10", &registry()).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Malformed { reason: "board reported twice", .. }
        ));
    }

    #[test]
    fn should_reject_snapshot_without_terminator() {
        assert!(decode_snapshot("PSA11X", &registry()).is_err());
        assert!(decode_snapshot("PSW11XE", &registry()).is_err());
    }

    #[test]
    fn should_decode_single_change() {
        let event = decode_change("PSW2111E", &registry()).unwrap();
        assert_eq!(event.address, SwitchAddress::new(2, 11));
        assert!(event.active);

        let event = decode_change("PSW1000E", &registry()).unwrap();
        assert_eq!(event.address, SwitchAddress::new(1, 0));
        assert!(!event.active);
    }

    #[test]
    fn should_reject_change_with_wrong_length() {
        for frame in ["PSW211E", "PSW21110E", ""] {
            assert!(
                matches!(decode_change(frame, &registry()), Err(FrameError::Malformed { .. })),
                "{frame:?}"
            );
        }
    }

    #[test]
    fn should_reject_change_with_non_digit_fields() {
        for frame in ["PSWa011E", "PSW2a11E", "PSW21a1E", "PSW2112E", "PSW2111X"] {
            assert!(
                matches!(decode_change(frame, &registry()), Err(FrameError::Malformed { .. })),
                "{frame:?}"
            );
        }
    }

    #[test]
    fn should_reject_change_beyond_board_switches() {
        let err = decode_change("PSW1021E", &registry()).unwrap_err();
        assert!(matches!(err, FrameError::Malformed { .. }));
    }

    #[test]
    fn should_report_unknown_board_before_registration() {
        let err = decode_change("PSW1001E", &BoardRegistry::new()).unwrap_err();
        assert!(matches!(err, FrameError::UnknownBoard { board: 1, .. }));
    }

    #[test]
    fn should_dispatch_on_opcode() {
        let registry = registry();
        assert!(matches!(
            decode_frame("PSW1011E", &registry),
            Ok(InboundFrame::Change(_))
        ));
        assert!(matches!(
            decode_frame("PSA10XE", &registry),
            Ok(InboundFrame::Snapshot(_))
        ));
        assert!(matches!(
            decode_frame("PXX1011E", &registry),
            Err(FrameError::Malformed { reason: "unknown opcode", .. })
        ));
        assert!(decode_frame("PS", &registry).is_err());
    }
}
