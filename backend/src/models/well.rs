//! Plate well coordinates
//!
//! Wells are addressed as a letter row and a 1-based column, e.g. `C4`.
//! Plates up to 384 wells are supported (rows A-P, columns 1-24).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest plate row (P on a 384-well plate)
pub const MAX_PLATE_ROW: u8 = 16;

/// Largest plate column (24 on a 384-well plate)
pub const MAX_PLATE_COLUMN: u8 = 24;

/// Errors produced when reading a well coordinate
#[derive(Debug, Error, PartialEq)]
pub enum CoordinateError {
    #[error("Invalid coordinates: \"{0}\"")]
    Malformed(String),

    #[error("Coordinates out of range: \"{0}\"")]
    OutOfRange(String),
}

/// A single well on a source or destination plate
///
/// # Example
/// ```
/// use transfer_sequencer_core_rs::Well;
///
/// let well: Well = "C04".parse().unwrap();
/// assert_eq!(well.row(), 3);
/// assert_eq!(well.column(), 4);
/// assert_eq!(well.to_string(), "C4");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Well {
    row: u8,
    column: u8,
}

impl Well {
    /// Top-left well, present on every plate
    pub const A1: Well = Well { row: 1, column: 1 };

    /// Create a well from 1-based row and column numbers
    ///
    /// Returns `None` when either coordinate is outside the plate.
    pub fn new(row: u8, column: u8) -> Option<Self> {
        if (1..=MAX_PLATE_ROW).contains(&row) && (1..=MAX_PLATE_COLUMN).contains(&column) {
            Some(Self { row, column })
        } else {
            None
        }
    }

    /// 1-based row (A = 1)
    pub fn row(&self) -> u8 {
        self.row
    }

    /// 1-based column
    pub fn column(&self) -> u8 {
        self.column
    }

    /// Row letter as printed on the plate
    pub fn row_letter(&self) -> char {
        (b'A' + self.row - 1) as char
    }

    /// Ordering key used when sorting a source plate: column first, then row
    pub fn column_major_key(&self) -> (u8, u8) {
        (self.column, self.row)
    }
}

impl FromStr for Well {
    type Err = CoordinateError;

    /// Accepts `C4` and `C04`, letter case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let letter = chars
            .next()
            .filter(|c| c.is_ascii_alphabetic())
            .ok_or_else(|| CoordinateError::Malformed(s.to_string()))?;
        let digits = chars.as_str().trim();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoordinateError::Malformed(s.to_string()));
        }
        let column: u32 = digits
            .parse()
            .map_err(|_| CoordinateError::OutOfRange(s.to_string()))?;

        let row = (letter.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
        if row > MAX_PLATE_ROW as u32 || column == 0 || column > MAX_PLATE_COLUMN as u32 {
            return Err(CoordinateError::OutOfRange(s.to_string()));
        }

        Ok(Self {
            row: row as u8,
            column: column as u8,
        })
    }
}

impl TryFrom<String> for Well {
    type Error = CoordinateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Well> for String {
    fn from(well: Well) -> Self {
        well.to_string()
    }
}

impl fmt::Display for Well {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row_letter(), self.column)
    }
}
