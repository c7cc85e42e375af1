//! Transfer table parsers
//!
//! Every supported file schema turns delimited text into the same ordered
//! `Vec<Operation>`. The schema is selected with a closed [`ParseMode`]
//! enumeration; mode keys as written in run configurations are:
//!
//! | key              | columns                                                   |
//! |------------------|-----------------------------------------------------------|
//! | `transfer`       | source container, source well, volume, destination well   |
//! | `adapter:<set>`  | destination well, adapter index, volume                   |
//! | `dilution`       | source well, sample volume, destination well, final volume |
//! | `lims_dilution`  | LIMS normalisation export (header row `Sample Name`)      |
//!
//! Rows whose volume is zero or negative are dropped. Errors carry the
//! 1-based input line of the offending record.

pub mod adapter;
pub mod dilution;
pub mod transfer;

pub use adapter::IndexSet;

use crate::error::SequencerError;
use crate::models::{Operation, Volume, Well};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parser selection
///
/// # Example
/// ```
/// use transfer_sequencer_core_rs::parsers::{IndexSet, ParseMode};
///
/// let mode: ParseMode = "adapter:truseq".parse().unwrap();
/// assert_eq!(mode, ParseMode::Adapter(IndexSet::TruSeq));
/// assert!("pcr".parse::<ParseMode>().is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ParseMode {
    /// Plain transfer table
    #[default]
    Transfer,
    /// Adapter/index plate table for the given adapter set
    Adapter(IndexSet),
    /// Simple dilution table
    Dilution,
    /// LIMS-exported dilution table
    LimsDilution,
}

impl ParseMode {
    /// Parse `text` into an ordered operation list
    pub fn parse(&self, text: &str) -> Result<Vec<Operation>, SequencerError> {
        let records = read_records(text)?;
        match self {
            ParseMode::Transfer => transfer::parse_transfers(&records),
            ParseMode::Adapter(set) => adapter::parse_adapter_transfers(&records, *set),
            ParseMode::Dilution => dilution::parse_dilution_transfers(&records),
            ParseMode::LimsDilution => dilution::parse_lims_dilution_transfers(&records),
        }
    }
}

impl FromStr for ParseMode {
    type Err = SequencerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        match key.as_str() {
            "transfer" => Ok(ParseMode::Transfer),
            "dilution" => Ok(ParseMode::Dilution),
            "lims_dilution" => Ok(ParseMode::LimsDilution),
            _ => match key.strip_prefix("adapter:") {
                Some(set) => set
                    .parse::<IndexSet>()
                    .map(ParseMode::Adapter)
                    .map_err(|_| SequencerError::UnknownMode(s.to_string())),
                None => Err(SequencerError::UnknownMode(s.to_string())),
            },
        }
    }
}

impl TryFrom<String> for ParseMode {
    type Error = SequencerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ParseMode> for String {
    fn from(mode: ParseMode) -> Self {
        mode.to_string()
    }
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseMode::Transfer => f.write_str("transfer"),
            ParseMode::Adapter(set) => write!(f, "adapter:{}", set),
            ParseMode::Dilution => f.write_str("dilution"),
            ParseMode::LimsDilution => f.write_str("lims_dilution"),
        }
    }
}

// ============================================================================
// Shared record helpers
// ============================================================================

/// One non-empty input row with its 1-based line number
#[derive(Debug, Clone)]
pub(crate) struct Row {
    pub line: usize,
    pub record: StringRecord,
}

impl Row {
    /// Cell at `index`, or a parse error naming the missing column
    pub fn cell(&self, index: usize) -> Result<&str, SequencerError> {
        self.record.get(index).ok_or_else(|| {
            SequencerError::parse(self.line, format!("missing column {}", index + 1))
        })
    }

    pub fn well(&self, index: usize) -> Result<Well, SequencerError> {
        self.cell(index)?
            .parse::<Well>()
            .map_err(|e| SequencerError::parse(self.line, e.to_string()))
    }

    pub fn volume(&self, index: usize) -> Result<Volume, SequencerError> {
        self.cell(index)?
            .parse::<Volume>()
            .map_err(|e| SequencerError::parse(self.line, e.to_string()))
    }
}

/// Split comma-delimited text into rows, skipping blank lines
pub(crate) fn read_records(text: &str) -> Result<Vec<Row>, SequencerError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| {
            let line = e.position().map(|p| p.line() as usize).unwrap_or(0);
            SequencerError::parse(line, e.to_string())
        })?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        rows.push(Row { line, record });
    }
    Ok(rows)
}
