//! Board registry — the set of boards discovered on the chain.
//!
//! Boards are kept in registration order. The cumulative switch and coil
//! numbering used by the cross-board check depends on that order, not on
//! the numeric address.

use crate::address::{CoilAddress, SwitchAddress};
use crate::board::{BoardFamily, ExpansionBoard};
use crate::error::RegistryError;

/// Most switches, or coils plus servos, a board can number on the wire.
pub const MAX_POINTS: u16 = 100;

/// Registered extension and lightshow boards.
#[derive(Debug, Clone, Default)]
pub struct BoardRegistry {
    extensions: Vec<ExpansionBoard>,
    lightshows: Vec<ExpansionBoard>,
}

impl BoardRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extension board.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::DuplicateAddress`] when any board, of either
    ///   family, already uses the address
    /// - [`RegistryError::AddressOutOfRange`] when it is outside `0..8`
    /// - [`RegistryError::TooManyPoints`] when its switches, or its coils and
    ///   servos together, exceed [`MAX_POINTS`]
    pub fn register_extension(&mut self, board: ExpansionBoard) -> Result<(), RegistryError> {
        self.check_free(board.address_id)?;
        BoardFamily::Extension.check_address(board.address_id)?;
        check_points(&board)?;
        self.extensions.push(board);
        Ok(())
    }

    /// Register a lightshow board.
    ///
    /// # Errors
    ///
    /// Same as [`register_extension`](Self::register_extension), with the
    /// address range `0..4`.
    pub fn register_lightshow(&mut self, board: ExpansionBoard) -> Result<(), RegistryError> {
        self.check_free(board.address_id)?;
        BoardFamily::Lightshow.check_address(board.address_id)?;
        check_points(&board)?;
        self.lightshows.push(board);
        Ok(())
    }

    fn check_free(&self, address: u8) -> Result<(), RegistryError> {
        let taken = self
            .extensions
            .iter()
            .chain(&self.lightshows)
            .any(|board| board.address_id == address);
        if taken {
            return Err(RegistryError::DuplicateAddress { address });
        }
        Ok(())
    }

    /// Look up a board of the given family by address.
    #[must_use]
    pub fn board_for(&self, family: BoardFamily, address_id: u8) -> Option<&ExpansionBoard> {
        let boards = match family {
            BoardFamily::Extension => &self.extensions,
            BoardFamily::Lightshow => &self.lightshows,
        };
        boards.iter().find(|board| board.address_id == address_id)
    }

    /// Shorthand for `board_for(BoardFamily::Extension, address_id)`.
    #[must_use]
    pub fn extension(&self, address_id: u8) -> Option<&ExpansionBoard> {
        self.board_for(BoardFamily::Extension, address_id)
    }

    /// Extension boards in registration order.
    pub fn extensions(&self) -> impl Iterator<Item = &ExpansionBoard> {
        self.extensions.iter()
    }

    /// Lightshow boards in registration order.
    pub fn lightshows(&self) -> impl Iterator<Item = &ExpansionBoard> {
        self.lightshows.iter()
    }

    /// Total number of boards across both families.
    #[must_use]
    pub fn len(&self) -> usize {
        self.extensions.len() + self.lightshows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty() && self.lightshows.is_empty()
    }

    /// Position of a switch in the chain-wide switch numbering.
    ///
    /// `None` when the switch's board is not a registered extension board or
    /// the index is past that board's switch count.
    #[must_use]
    pub fn global_switch_index(&self, address: SwitchAddress) -> Option<u32> {
        self.global_index(address.board_id, address.index, |b| b.switch_count)
    }

    /// Position of a coil in the chain-wide coil numbering, `None` as for
    /// [`global_switch_index`](Self::global_switch_index).
    #[must_use]
    pub fn global_coil_index(&self, address: CoilAddress) -> Option<u32> {
        self.global_index(address.board_id, address.index, |b| b.coil_count)
    }

    fn global_index(
        &self,
        board_id: u8,
        index: u8,
        count: impl Fn(&ExpansionBoard) -> u8,
    ) -> Option<u32> {
        let mut base = 0u32;
        for board in &self.extensions {
            if board.address_id == board_id {
                return (index < count(board)).then_some(base + u32::from(index));
            }
            base += u32::from(count(board));
        }
        None
    }
}

fn check_points(board: &ExpansionBoard) -> Result<(), RegistryError> {
    let outputs = u16::from(board.coil_count) + u16::from(board.servo_count);
    for (points, count) in [
        ("switches", u16::from(board.switch_count)),
        ("coils and servos", outputs),
    ] {
        if count > MAX_POINTS {
            return Err(RegistryError::TooManyPoints {
                address: board.address_id,
                points,
                count,
            });
        }
    }
    Ok(())
}
