//! Tip racks
//!
//! - **algebra**: pure count → (row, column) mapping for the four corners
//! - **tip_rack**: bounded usage counter with peek/consume/place

pub mod algebra;
pub mod tip_rack;

pub use algebra::{position_for, Corner, RackOrigin, TipPosition, RACK_COLUMNS, RACK_ROWS, RACK_SIZE};
pub use tip_rack::TipRack;
