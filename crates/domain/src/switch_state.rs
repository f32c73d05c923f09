//! Switch state — transitions and full snapshots decoded from the board.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::address::SwitchAddress;

/// A single switch reported active or inactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SwitchStateEvent {
    pub address: SwitchAddress,
    pub active: bool,
}

/// The complete known state of every reported switch.
///
/// A snapshot replaces any earlier state; it is not a diff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchSnapshot {
    states: BTreeMap<SwitchAddress, bool>,
}

impl SwitchSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a state, returning the previous one if any.
    pub fn set(&mut self, address: SwitchAddress, active: bool) -> Option<bool> {
        self.states.insert(address, active)
    }

    /// Fold a single transition into the snapshot.
    pub fn apply(&mut self, event: SwitchStateEvent) -> Option<bool> {
        self.set(event.address, event.active)
    }

    #[must_use]
    pub fn get(&self, address: SwitchAddress) -> Option<bool> {
        self.states.get(&address).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// States as events, ordered by board then index.
    pub fn events(&self) -> impl Iterator<Item = SwitchStateEvent> + '_ {
        self.states
            .iter()
            .map(|(address, active)| SwitchStateEvent {
                address: *address,
                active: *active,
            })
    }

    /// States keyed by their `"<board>-<index>"` number.
    #[must_use]
    pub fn to_number_map(&self) -> BTreeMap<String, bool> {
        self.states
            .iter()
            .map(|(address, active)| (address.to_string(), *active))
            .collect()
    }
}
