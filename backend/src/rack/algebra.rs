//! Tip position algebra
//!
//! Maps a 1-based tip count onto the 8x12 grid of a tip rack. Counting is
//! column-major: the row cycles through a column of 8 before the column
//! moves on. The rack corner selects one of four closed-form variants.
//!
//! Count 96 always lands on the named corner and count 1 on the corner
//! diagonally opposite to it.

use crate::error::SequencerError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rows on a tip rack
pub const RACK_ROWS: u8 = 8;

/// Columns on a tip rack
pub const RACK_COLUMNS: u8 = 12;

/// Positions on a tip rack
pub const RACK_SIZE: u8 = RACK_ROWS * RACK_COLUMNS;

/// Corner configuration as written in a run configuration
///
/// Only rows 1/8 and columns 1/12 are meaningful; anything else is rejected
/// when converted into a [`Corner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RackOrigin {
    pub row: u8,
    pub column: u8,
}

impl Default for RackOrigin {
    fn default() -> Self {
        Self {
            row: RACK_ROWS,
            column: RACK_COLUMNS,
        }
    }
}

/// Validated rack corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// The origin this corner was configured from
    pub fn origin(&self) -> RackOrigin {
        match self {
            Corner::TopLeft => RackOrigin { row: 1, column: 1 },
            Corner::TopRight => RackOrigin { row: 1, column: RACK_COLUMNS },
            Corner::BottomLeft => RackOrigin { row: RACK_ROWS, column: 1 },
            Corner::BottomRight => RackOrigin { row: RACK_ROWS, column: RACK_COLUMNS },
        }
    }

    fn top(&self) -> bool {
        matches!(self, Corner::TopLeft | Corner::TopRight)
    }

    fn left(&self) -> bool {
        matches!(self, Corner::TopLeft | Corner::BottomLeft)
    }
}

impl TryFrom<RackOrigin> for Corner {
    type Error = SequencerError;

    fn try_from(origin: RackOrigin) -> Result<Self, Self::Error> {
        match (origin.row, origin.column) {
            (1, 1) => Ok(Corner::TopLeft),
            (1, RACK_COLUMNS) => Ok(Corner::TopRight),
            (RACK_ROWS, 1) => Ok(Corner::BottomLeft),
            (RACK_ROWS, RACK_COLUMNS) => Ok(Corner::BottomRight),
            _ => Err(SequencerError::InvalidOrigin {
                row: origin.row,
                column: origin.column,
            }),
        }
    }
}

/// A physical tip position, row in 1..=8 and column in 1..=12
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TipPosition {
    pub row: u8,
    pub column: u8,
}

impl fmt::Display for TipPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'A' + self.row - 1) as char, self.column)
    }
}

/// Position of the `count`-th tip for the given corner
///
/// Returns `None` for counts outside `1..=96`.
///
/// # Example
/// ```
/// use transfer_sequencer_core_rs::rack::{position_for, Corner, TipPosition};
///
/// assert_eq!(position_for(1, Corner::TopLeft), Some(TipPosition { row: 8, column: 12 }));
/// assert_eq!(position_for(96, Corner::TopLeft), Some(TipPosition { row: 1, column: 1 }));
/// assert_eq!(position_for(0, Corner::TopLeft), None);
/// ```
pub fn position_for(count: u8, corner: Corner) -> Option<TipPosition> {
    if count == 0 || count > RACK_SIZE {
        return None;
    }
    let k = count - 1;
    let within_column = k % RACK_ROWS;
    let column_index = k / RACK_ROWS;

    let row = if corner.top() {
        RACK_ROWS - within_column
    } else {
        within_column + 1
    };
    let column = if corner.left() {
        RACK_COLUMNS - column_index
    } else {
        column_index + 1
    };

    Some(TipPosition { row, column })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_validation() {
        assert_eq!(
            Corner::try_from(RackOrigin { row: 8, column: 12 }),
            Ok(Corner::BottomRight)
        );
        assert_eq!(
            Corner::try_from(RackOrigin { row: 4, column: 12 }),
            Err(SequencerError::InvalidOrigin { row: 4, column: 12 })
        );
        assert_eq!(
            Corner::try_from(RackOrigin { row: 1, column: 6 }),
            Err(SequencerError::InvalidOrigin { row: 1, column: 6 })
        );
    }

    #[test]
    fn test_corner_round_trips_origin() {
        for corner in Corner::ALL {
            assert_eq!(Corner::try_from(corner.origin()), Ok(corner));
        }
    }

    #[test]
    fn test_bottom_right_counts_down_the_first_column() {
        let corner = Corner::BottomRight;
        assert_eq!(position_for(1, corner), Some(TipPosition { row: 1, column: 1 }));
        assert_eq!(position_for(8, corner), Some(TipPosition { row: 8, column: 1 }));
        assert_eq!(position_for(9, corner), Some(TipPosition { row: 1, column: 2 }));
        assert_eq!(position_for(96, corner), Some(TipPosition { row: 8, column: 12 }));
    }

    #[test]
    fn test_count_96_lands_on_named_corner() {
        for corner in Corner::ALL {
            let origin = corner.origin();
            assert_eq!(
                position_for(96, corner),
                Some(TipPosition { row: origin.row, column: origin.column })
            );
        }
    }

    #[test]
    fn test_out_of_range_counts() {
        for corner in Corner::ALL {
            assert_eq!(position_for(0, corner), None);
            assert_eq!(position_for(97, corner), None);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(TipPosition { row: 8, column: 12 }.to_string(), "H12");
    }
}
