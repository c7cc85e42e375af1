//! Transfer sequencer
//!
//! - **engine**: cursor, lookahead and the per-step decision API
//! - **batch**: per-source-container statistics computed at load
//! - **step**: stamped step plans and tip commits
//! - **checkpoint**: save/restore of run progress

pub mod batch;
pub mod checkpoint;
pub mod engine;
pub mod step;

// Re-export main types for convenience
pub use batch::BatchStats;
pub use checkpoint::{compute_content_hash, SequencerSnapshot};
pub use engine::{SequencerConfig, SequencerState, TransferSequencer};
pub use step::{StepPlan, TipCommit};
