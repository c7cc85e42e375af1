//! Domain models for the transfer sequencer

pub mod operation;
pub mod volume;
pub mod well;

// Re-exports
pub use operation::{ContainerId, Operation};
pub use volume::{Volume, VolumeError};
pub use well::{CoordinateError, Well};
