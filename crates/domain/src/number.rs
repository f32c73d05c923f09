//! Number parsing — `"<board>-<index>"` strings to typed addresses.
//!
//! Every parser checks the board against the registry and the index against
//! the board's declared count. Valid ranges in error messages are 1-based.

use crate::address::{CoilAddress, ServoAddress, SwitchAddress};
use crate::board::ExpansionBoard;
use crate::error::{IoKind, ParseError};
use crate::registry::BoardRegistry;

/// Parse a switch number such as `"1-12"`.
///
/// # Errors
///
/// - [`ParseError::InvalidFormat`] when the text is not two runs of ASCII
///   digits separated by `-`
/// - [`ParseError::UnknownBoard`] when the board is not a registered
///   extension board
/// - [`ParseError::IndexOutOfRange`] when the index is not below the
///   board's `switch_count`
pub fn parse_switch(text: &str, registry: &BoardRegistry) -> Result<SwitchAddress, ParseError> {
    let (board, index) = resolve(IoKind::Switch, text, registry)?;
    let index = within(IoKind::Switch, text, board, index, 0, board.switch_count)?;
    Ok(SwitchAddress::new(board.address_id, index))
}

/// Parse a coil number such as `"0-3"`.
///
/// # Errors
///
/// Same as [`parse_switch`], bounded by the board's `coil_count`.
pub fn parse_coil(text: &str, registry: &BoardRegistry) -> Result<CoilAddress, ParseError> {
    let (board, index) = resolve(IoKind::Coil, text, registry)?;
    let index = within(IoKind::Coil, text, board, index, 0, board.coil_count)?;
    Ok(CoilAddress::new(board.address_id, index))
}

/// Parse a servo number such as `"0-10"`.
///
/// Servos are numbered in sequence right after the board's last coil. The
/// slot `index - coil_count` is bounds-checked and the wire number is kept
/// in the address.
///
/// # Errors
///
/// Same as [`parse_switch`]; [`ParseError::IndexOutOfRange`] reports the
/// wire window `coil_count + 1 ..= coil_count + servo_count`.
pub fn parse_servo(text: &str, registry: &BoardRegistry) -> Result<ServoAddress, ParseError> {
    let (board, index) = resolve(IoKind::Servo, text, registry)?;
    let slot = within(
        IoKind::Servo,
        text,
        board,
        index,
        board.coil_count,
        board.servo_count,
    )?;
    Ok(ServoAddress::new(board.address_id, board.coil_count + slot))
}

fn resolve<'r>(
    kind: IoKind,
    text: &str,
    registry: &'r BoardRegistry,
) -> Result<(&'r ExpansionBoard, u32), ParseError> {
    let invalid = || ParseError::InvalidFormat {
        kind,
        number: text.to_string(),
    };

    let (board, index) = text.split_once('-').ok_or_else(invalid)?;
    if !is_digits(board) || !is_digits(index) {
        return Err(invalid());
    }
    let board: u8 = board.parse().map_err(|_| invalid())?;
    // only overflow is left, and that is past any board's count
    let index: u32 = index.parse().unwrap_or(u32::MAX);

    let board = registry
        .extension(board)
        .ok_or_else(|| ParseError::UnknownBoard {
            kind,
            board,
            number: text.to_string(),
        })?;
    Ok((board, index))
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Map a raw index into `offset..offset + count` and return the slot.
fn within(
    kind: IoKind,
    text: &str,
    board: &ExpansionBoard,
    index: u32,
    offset: u8,
    count: u8,
) -> Result<u8, ParseError> {
    let out_of_range = || ParseError::IndexOutOfRange {
        kind,
        board: board.address_id,
        count,
        valid: u32::from(offset) + 1..=u32::from(offset) + u32::from(count),
        number: text.to_string(),
    };

    let slot = index
        .checked_sub(u32::from(offset))
        .filter(|slot| *slot < u32::from(count))
        .ok_or_else(out_of_range)?;
    u8::try_from(slot).map_err(|_| out_of_range())
}
