//! Typed physical addresses of switches, coils and servos.
//!
//! Addresses are only produced by the registry-aware parsers in
//! [`number`](crate::number) or by frame decoding, so holding one means its
//! board was registered and its index was in range at that time.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_address {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name {
            /// Address id of the extension board.
            pub board_id: u8,
            /// Zero-based index on that board.
            pub index: u8,
        }

        impl $name {
            #[must_use]
            pub fn new(board_id: u8, index: u8) -> Self {
                Self { board_id, index }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", self.board_id, self.index)
            }
        }
    };
}

define_address!(
    /// A switch input, zero-based within the board's `switch_count`.
    SwitchAddress
);

define_address!(
    /// A coil driver output, zero-based within the board's `coil_count`.
    CoilAddress
);

define_address!(
    /// A servo output, held under its wire number.
    ///
    /// Servos are numbered right after the board's last coil, so `index` is
    /// `coil_count + slot` with `slot` below the board's `servo_count`.
    ServoAddress
);
