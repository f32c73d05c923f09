//! Cross-board validation for switch → coil rules.
//!
//! A hardware rule runs on the board itself, so the switch and the coil it
//! drives must sit on the same extension board. Boards are walked in
//! registration order with running switch and coil bases.

use crate::address::{CoilAddress, SwitchAddress};
use crate::error::CrossBoardError;
use crate::registry::BoardRegistry;

/// Check that `switch` and `coil` fall in the same board's cumulative range.
///
/// # Errors
///
/// Returns [`CrossBoardError`] when no single board covers both, including
/// when either address refers to a board that is not registered or sits past
/// its own board's count.
pub fn same_board(
    switch: SwitchAddress,
    coil: CoilAddress,
    registry: &BoardRegistry,
) -> Result<(), CrossBoardError> {
    let mismatch = || CrossBoardError {
        switch: switch.to_string(),
        coil: coil.to_string(),
    };

    let switch_number = registry.global_switch_index(switch).ok_or_else(mismatch)?;
    let coil_number = registry.global_coil_index(coil).ok_or_else(mismatch)?;

    let mut switch_base = 0u32;
    let mut coil_base = 0u32;
    for board in registry.extensions() {
        let switch_end = switch_base + u32::from(board.switch_count);
        let coil_end = coil_base + u32::from(board.coil_count);
        if (switch_base..switch_end).contains(&switch_number)
            && (coil_base..coil_end).contains(&coil_number)
        {
            return Ok(());
        }
        switch_base = switch_end;
        coil_base = coil_end;
    }

    Err(mismatch())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::ExpansionBoard;

    fn registry() -> BoardRegistry {
        let mut registry = BoardRegistry::new();
        // registered out of address order on purpose
        registry
            .register_extension(ExpansionBoard::builder(3).coils(2).switches(4).build())
            .unwrap();
        registry
            .register_extension(ExpansionBoard::builder(1).coils(6).switches(10).build())
            .unwrap();
        registry
            .register_extension(ExpansionBoard::builder(2).coils(0).switches(8).build())
            .unwrap();
        registry
    }

    #[test]
    fn should_accept_switch_and_coil_on_same_board() {
        let registry = registry();
        assert!(same_board(SwitchAddress::new(3, 3), CoilAddress::new(3, 1), &registry).is_ok());
        assert!(same_board(SwitchAddress::new(1, 0), CoilAddress::new(1, 5), &registry).is_ok());
    }

    #[test]
    fn should_reject_switch_and_coil_on_different_boards() {
        let registry = registry();
        let err = same_board(SwitchAddress::new(1, 2), CoilAddress::new(3, 0), &registry)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "driver 3-0 and switch 1-2 are on different boards, cannot apply rule"
        );
    }

    #[test]
    fn should_reject_switch_on_board_without_coils() {
        let registry = registry();
        assert!(same_board(SwitchAddress::new(2, 0), CoilAddress::new(1, 0), &registry).is_err());
    }

    #[test]
    fn should_reject_switch_index_spilling_into_next_board() {
        let registry = registry();
        // board 3 has 4 switches; 3-6 would fall in board 1's cumulative range
        assert!(same_board(SwitchAddress::new(3, 6), CoilAddress::new(1, 0), &registry).is_err());
        assert!(same_board(SwitchAddress::new(3, 4), CoilAddress::new(3, 0), &registry).is_err());
    }

    #[test]
    fn should_reject_coil_index_past_its_board() {
        let registry = registry();
        // board 3 has 2 coils; 3-2 would be board 1's first coil
        assert!(same_board(SwitchAddress::new(1, 0), CoilAddress::new(3, 2), &registry).is_err());
    }

    #[test]
    fn should_reject_addresses_on_unregistered_boards() {
        let registry = registry();
        assert!(same_board(SwitchAddress::new(5, 0), CoilAddress::new(3, 0), &registry).is_err());
        assert!(same_board(SwitchAddress::new(3, 0), CoilAddress::new(5, 0), &registry).is_err());
    }
}
