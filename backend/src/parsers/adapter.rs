//! Adapter (index plate) tables
//!
//! Format: `destination_well, index, volume`. Each named adapter set fixes
//! which well of the adapter plate holds which index. Rows are visited in
//! index order and the tip is kept between consecutive rows that share an
//! index.

use crate::error::SequencerError;
use crate::models::{ContainerId, Operation, Volume, Well};
use crate::parsers::Row;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Container name used for every adapter operation
pub const ADAPTER_PLATE: &str = "adapter_plate";

/// Indices in plate order (A1, B1, ... H1, A2, ...)
const TRUSEQ_INDICES: &[u32] = &[
    1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 18, 19, 20, 21, 22, 23, 25, 27,
];
const SURESELECT_INDICES: &[u32] = &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13];

/// Supported adapter plate layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexSet {
    TruSeq,
    SureSelect,
}

impl IndexSet {
    fn indices(&self) -> &'static [u32] {
        match self {
            IndexSet::TruSeq => TRUSEQ_INDICES,
            IndexSet::SureSelect => SURESELECT_INDICES,
        }
    }

    /// Adapter plate well holding `index`
    ///
    /// # Example
    /// ```
    /// use transfer_sequencer_core_rs::parsers::IndexSet;
    ///
    /// assert_eq!(IndexSet::TruSeq.source_well(18).unwrap().to_string(), "A3");
    /// assert!(IndexSet::TruSeq.source_well(17).is_none());
    /// ```
    pub fn source_well(&self, index: u32) -> Option<Well> {
        let slot = self.indices().iter().position(|&i| i == index)?;
        Well::new((slot % 8) as u8 + 1, (slot / 8) as u8 + 1)
    }
}

impl FromStr for IndexSet {
    type Err = SequencerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "truseq" => Ok(IndexSet::TruSeq),
            "sureselect" => Ok(IndexSet::SureSelect),
            _ => Err(SequencerError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for IndexSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexSet::TruSeq => f.write_str("truseq"),
            IndexSet::SureSelect => f.write_str("sureselect"),
        }
    }
}

struct AdapterRow {
    line: usize,
    destination_well: Well,
    index: u32,
    volume: Volume,
}

pub(crate) fn parse_adapter_transfers(
    rows: &[Row],
    set: IndexSet,
) -> Result<Vec<Operation>, SequencerError> {
    let mut parsed = Vec::with_capacity(rows.len());
    for row in rows {
        let destination_well = row.well(0)?;
        let index_cell = row.cell(1)?;
        let index = index_cell.parse::<u32>().map_err(|_| {
            SequencerError::parse(row.line, format!("invalid index \"{}\"", index_cell))
        })?;
        let volume = row.volume(2)?;
        parsed.push(AdapterRow {
            line: row.line,
            destination_well,
            index,
            volume,
        });
    }

    parsed.sort_by_key(|r| r.index);

    let container = ContainerId::new(ADAPTER_PLATE);
    let mut operations = Vec::with_capacity(parsed.len());
    let mut previous_index = None;
    for r in &parsed {
        let source_well = set.source_well(r.index).ok_or_else(|| {
            SequencerError::parse(r.line, format!("unknown index {} in set {}", r.index, set))
        })?;
        if r.volume.is_positive() {
            // Compared against the last emitted row so a dropped row never
            // leaves the next transfer without a tip
            let new_tip = previous_index != Some(r.index);
            previous_index = Some(r.index);
            operations.push(Operation::new(
                container.clone(),
                source_well,
                r.volume,
                r.destination_well,
                new_tip,
            ));
        }
    }

    Ok(operations)
}
