//! Expansion board — a peripheral on the PKONE chain.
//!
//! Extension boards expose switches, coils and servos. Lightshow boards
//! expose lighting outputs only; this layer tracks them solely so that they
//! take part in the shared address-uniqueness check.

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// The two board families sharing one address namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardFamily {
    Extension,
    Lightshow,
}

impl BoardFamily {
    /// Number of addresses the family can occupy (`0..capacity`).
    #[must_use]
    pub fn capacity(self) -> u8 {
        match self {
            Self::Extension => 8,
            Self::Lightshow => 4,
        }
    }

    /// Check that `address` fits in this family's address range.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AddressOutOfRange`] when it does not.
    pub fn check_address(self, address: u8) -> Result<(), RegistryError> {
        if address < self.capacity() {
            Ok(())
        } else {
            Err(RegistryError::AddressOutOfRange {
                family: self,
                address,
            })
        }
    }
}

impl std::fmt::Display for BoardFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Extension => f.write_str("extension"),
            Self::Lightshow => f.write_str("lightshow"),
        }
    }
}

/// A registered board and its declared I/O counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionBoard {
    pub address_id: u8,
    #[serde(default)]
    pub coil_count: u8,
    #[serde(default)]
    pub switch_count: u8,
    #[serde(default)]
    pub servo_count: u8,
    #[serde(default)]
    pub firmware_version: String,
    #[serde(default)]
    pub hardware_revision: String,
}

impl ExpansionBoard {
    /// Create a builder for constructing an [`ExpansionBoard`].
    #[must_use]
    pub fn builder(address_id: u8) -> ExpansionBoardBuilder {
        ExpansionBoardBuilder {
            address_id,
            ..ExpansionBoardBuilder::default()
        }
    }
}

/// Step-by-step builder for [`ExpansionBoard`].
#[derive(Debug, Default)]
pub struct ExpansionBoardBuilder {
    address_id: u8,
    coil_count: u8,
    switch_count: u8,
    servo_count: u8,
    firmware_version: Option<String>,
    hardware_revision: Option<String>,
}

impl ExpansionBoardBuilder {
    #[must_use]
    pub fn coils(mut self, count: u8) -> Self {
        self.coil_count = count;
        self
    }

    #[must_use]
    pub fn switches(mut self, count: u8) -> Self {
        self.switch_count = count;
        self
    }

    #[must_use]
    pub fn servos(mut self, count: u8) -> Self {
        self.servo_count = count;
        self
    }

    #[must_use]
    pub fn firmware_version(mut self, version: impl Into<String>) -> Self {
        self.firmware_version = Some(version.into());
        self
    }

    #[must_use]
    pub fn hardware_revision(mut self, revision: impl Into<String>) -> Self {
        self.hardware_revision = Some(revision.into());
        self
    }

    /// Consume the builder. Address ranges are checked at registration.
    #[must_use]
    pub fn build(self) -> ExpansionBoard {
        ExpansionBoard {
            address_id: self.address_id,
            coil_count: self.coil_count,
            switch_count: self.switch_count,
            servo_count: self.servo_count,
            firmware_version: self.firmware_version.unwrap_or_default(),
            hardware_revision: self.hardware_revision.unwrap_or_default(),
        }
    }
}
