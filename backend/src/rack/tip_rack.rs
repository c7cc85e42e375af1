//! Tip rack usage tracking
//!
//! A `TipRack` wraps the position algebra with a bounded usage counter.
//! The same type serves as the supply rack (fresh tips are consumed) and the
//! placement rack (used tips are placed into empty slots). Both compute the
//! position of count `used + 1`, so a supply rack and a placement rack that
//! share a corner and advance in lockstep pair every tip with the slot it was
//! taken from.
//!
//! Running out of positions is an expected event, reported as `None`.

use crate::error::SequencerError;
use crate::rack::algebra::{position_for, Corner, TipPosition, RACK_SIZE};
use serde::{Deserialize, Serialize};

/// A single 8x12 tip rack
///
/// # Example
/// ```
/// use transfer_sequencer_core_rs::rack::{Corner, TipPosition, TipRack};
///
/// let mut rack = TipRack::new(96, Corner::TopLeft).unwrap();
/// assert_eq!(rack.consume(), Some(TipPosition { row: 8, column: 12 }));
/// assert_eq!(rack.used_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TipRack {
    /// Number of usable positions, counted from count 1
    capacity: u8,
    /// Positions consumed or filled so far
    used_count: u8,
    corner: Corner,
}

impl TipRack {
    /// Create an unused rack
    ///
    /// # Errors
    /// `InvalidConfig` if capacity exceeds the 96 positions of a rack.
    pub fn new(capacity: u8, corner: Corner) -> Result<Self, SequencerError> {
        if capacity > RACK_SIZE {
            return Err(SequencerError::InvalidConfig(format!(
                "tip rack capacity {} exceeds {} positions",
                capacity, RACK_SIZE
            )));
        }
        Ok(Self {
            capacity,
            used_count: 0,
            corner,
        })
    }

    pub fn capacity(&self) -> u8 {
        self.capacity
    }

    pub fn used_count(&self) -> u8 {
        self.used_count
    }

    pub fn corner(&self) -> Corner {
        self.corner
    }

    /// Positions still available
    pub fn remaining(&self) -> u8 {
        self.capacity - self.used_count
    }

    /// Position the next `consume()` would yield, `None` once exhausted
    pub fn peek_next(&self) -> Option<TipPosition> {
        if self.used_count >= self.capacity {
            return None;
        }
        position_for(self.used_count + 1, self.corner)
    }

    /// Position the next `place()` would fill, `None` once the rack is full
    ///
    /// Slots fill in the same order tips are consumed.
    pub fn peek_next_empty(&self) -> Option<TipPosition> {
        self.peek_next()
    }

    /// Take the next tip; the counter only moves when a position is returned
    pub fn consume(&mut self) -> Option<TipPosition> {
        let position = self.peek_next()?;
        self.used_count += 1;
        Some(position)
    }

    /// Fill the next empty slot; the counter only moves when a position is returned
    pub fn place(&mut self) -> Option<TipPosition> {
        let position = self.peek_next_empty()?;
        self.used_count += 1;
        Some(position)
    }

    pub fn has_capacity(&self) -> bool {
        self.used_count < self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.used_count == 0
    }

    /// Operator swapped in a fresh rack with the same capacity and corner
    pub fn replace(&mut self) {
        self.used_count = 0;
    }

    /// Rebuild a rack at a recorded counter (checkpoint restore)
    pub(crate) fn with_used_count(mut self, used_count: u8) -> Result<Self, SequencerError> {
        if used_count > self.capacity {
            return Err(SequencerError::Checkpoint(format!(
                "used count {} exceeds rack capacity {}",
                used_count, self.capacity
            )));
        }
        self.used_count = used_count;
        Ok(self)
    }
}
