//! Operation model
//!
//! One planned liquid transfer: aspirate `volume` from `source_well` of
//! `source_container`, dispense into `destination_well`. Operations are
//! produced by a parser and never modified afterwards.

use crate::models::{Volume, Well};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a source plate or reservoir
///
/// Identifiers are normalised on construction so that equality is
/// meaningful: integer-looking values (`"1"`, `"01"`) become `Number`,
/// everything else is trimmed and lower-cased into `Name`.
///
/// Ordering puts all numbers (ascending) before all names (lexicographic).
///
/// # Example
/// ```
/// use transfer_sequencer_core_rs::ContainerId;
///
/// assert_eq!(ContainerId::new("01"), ContainerId::new("1"));
/// assert_eq!(ContainerId::new(" Plate_A "), ContainerId::new("plate_a"));
/// assert!(ContainerId::new("9") < ContainerId::new("10"));
/// assert!(ContainerId::new("10") < ContainerId::new("a"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContainerId {
    Number(i64),
    Name(String),
}

impl ContainerId {
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(n) => ContainerId::Number(n),
            Err(_) => ContainerId::Name(trimmed.to_lowercase()),
        }
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerId::Number(n) => write!(f, "{}", n),
            ContainerId::Name(name) => f.write_str(name),
        }
    }
}

/// A single pipetting operation
///
/// # Example
/// ```
/// use transfer_sequencer_core_rs::{ContainerId, Operation, Volume, Well};
///
/// let op = Operation::new(
///     ContainerId::new("1"),
///     "A1".parse().unwrap(),
///     Volume::from_thousandths(10_000),
///     "B2".parse().unwrap(),
///     true,
/// );
/// assert_eq!(op.volume().to_string(), "10");
/// assert!(op.prefer_new_tip());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OperationFields")]
pub struct Operation {
    source_container: ContainerId,
    source_well: Well,
    volume: Volume,
    destination_well: Well,
    /// Tip-reuse hint decided by the parser
    prefer_new_tip: bool,
}

/// Unchecked wire form of an [`Operation`]
#[derive(Deserialize)]
struct OperationFields {
    source_container: ContainerId,
    source_well: Well,
    volume: Volume,
    destination_well: Well,
    prefer_new_tip: bool,
}

impl TryFrom<OperationFields> for Operation {
    type Error = String;

    fn try_from(fields: OperationFields) -> Result<Self, Self::Error> {
        if !fields.volume.is_positive() {
            return Err(format!("volume must be positive, got {}", fields.volume));
        }
        Ok(Operation::new(
            fields.source_container,
            fields.source_well,
            fields.volume,
            fields.destination_well,
            fields.prefer_new_tip,
        ))
    }
}

impl Operation {
    /// Create a new operation
    ///
    /// # Panics
    /// Panics if volume <= 0. Parsers drop zero and negative rows before
    /// constructing operations.
    pub fn new(
        source_container: ContainerId,
        source_well: Well,
        volume: Volume,
        destination_well: Well,
        prefer_new_tip: bool,
    ) -> Self {
        assert!(volume.is_positive(), "volume must be positive");

        Self {
            source_container,
            source_well,
            volume,
            destination_well,
            prefer_new_tip,
        }
    }

    pub fn source_container(&self) -> &ContainerId {
        &self.source_container
    }

    pub fn source_well(&self) -> Well {
        self.source_well
    }

    pub fn volume(&self) -> Volume {
        self.volume
    }

    pub fn destination_well(&self) -> Well {
        self.destination_well
    }

    pub fn prefer_new_tip(&self) -> bool {
        self.prefer_new_tip
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{source: {}:{}, volume: {}, destination: {}, new_tip: {}}}",
            self.source_container,
            self.source_well,
            self.volume,
            self.destination_well,
            self.prefer_new_tip
        )
    }
}
