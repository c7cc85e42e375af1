//! Transfer Sequencer Core - Rust Engine
//!
//! Step-by-step decision engine for automated liquid-handling runs: loads a
//! transfer table, walks it one operation at a time with a one-step
//! lookahead, and tracks two tip racks (fresh tips in, used tips out).
//!
//! # Architecture
//!
//! - **models**: Domain types (Well, Volume, ContainerId, Operation)
//! - **parsers**: Transfer table schemas (transfer, adapter, dilution, LIMS)
//! - **rack**: Tip position algebra and rack counters
//! - **sequencer**: Cursor, batch statistics, step plans, checkpoints
//! - **journal**: Per-run CSV audit trail
//! - **io**: Injected text storage and logging collaborators
//!
//! # Critical Invariants
//!
//! 1. Volumes are integer thousandths of a microliter (`Volume(i64)`)
//! 2. Rack counters never exceed rack capacity; a full rack reports `None`
//! 3. Supply and placement racks advance in lockstep on commit
//! 4. Sum of batch sizes equals the number of loaded operations
//! 5. FFI boundary is minimal and safe

// Module declarations
pub mod error;
pub mod io;
pub mod journal;
pub mod models;
pub mod parsers;
pub mod rack;
pub mod sequencer;

// Re-exports for convenience
pub use error::SequencerError;
pub use io::{FsStorage, Logger, MemoryLogger, MemoryStorage, TextStorage, TracingLogger};
pub use journal::RunJournal;
pub use models::{ContainerId, Operation, Volume, Well};
pub use parsers::ParseMode;
pub use rack::{Corner, RackOrigin, TipPosition, TipRack};
pub use sequencer::{SequencerConfig, SequencerState, StepPlan, TipCommit, TransferSequencer};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn transfer_sequencer_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::sequencer::PyTransferManager>()?;
    Ok(())
}
