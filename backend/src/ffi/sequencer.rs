//! PyO3 wrapper for TransferSequencer
//!
//! Exposes the step-by-step API to a Python-scripted instrument host. Wells
//! cross the boundary as strings (`"C4"`), tip positions as `(row, column)`
//! tuples and volumes as microliter floats.

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::error::SequencerError;
use crate::rack::{RackOrigin, TipPosition};
use crate::sequencer::{SequencerConfig, TransferSequencer};

fn to_value_error(err: SequencerError) -> PyErr {
    PyErr::new::<PyValueError, _>(err.to_string())
}

fn position_tuple(position: Option<TipPosition>) -> Option<(u8, u8)> {
    position.map(|p| (p.row, p.column))
}

/// Python wrapper for the Rust sequencer
///
/// # Example (from Python)
///
/// ```python
/// from transfer_sequencer._core import TransferManager
///
/// seq = TransferManager(mode="adapter:truseq", origin_row=1, origin_column=1)
/// seq.load_file("adapters.csv")
/// if not seq.is_healthy():
///     raise RuntimeError(seq.last_error())
///
/// while seq.advance() and seq.source_well() is not None:
///     robot.pick_tip(seq.tip_supply_position())
///     robot.transfer(seq.source_well(), seq.destination_well(), seq.volume())
///     robot.drop_tip(seq.tip_placement_position())
///     seq.commit_tip_state()
/// ```
#[pyclass(name = "TransferManager")]
pub struct PyTransferManager {
    inner: TransferSequencer,
}

#[pymethods]
impl PyTransferManager {
    /// Create a sequencer
    ///
    /// # Errors
    ///
    /// Raises ValueError if:
    /// - `mode` is not a known parser key
    /// - the origin is not a rack corner
    /// - a capacity exceeds 96
    #[new]
    #[pyo3(signature = (mode="transfer", origin_row=8, origin_column=12, supply_capacity=96, placement_capacity=96))]
    fn new(
        mode: &str,
        origin_row: u8,
        origin_column: u8,
        supply_capacity: u8,
        placement_capacity: u8,
    ) -> PyResult<Self> {
        let config = SequencerConfig {
            mode: mode.parse().map_err(to_value_error)?,
            tip_origin: RackOrigin {
                row: origin_row,
                column: origin_column,
            },
            supply_capacity,
            placement_capacity,
        };
        let inner = TransferSequencer::new(config).map_err(to_value_error)?;
        Ok(PyTransferManager { inner })
    }

    /// Create a sequencer from a JSON run configuration
    #[staticmethod]
    fn from_json(config: &str) -> PyResult<Self> {
        let config: SequencerConfig = serde_json::from_str(config)
            .map_err(|e| PyErr::new::<PyValueError, _>(format!("Invalid configuration: {}", e)))?;
        let inner = TransferSequencer::new(config).map_err(to_value_error)?;
        Ok(PyTransferManager { inner })
    }

    // ========================================================================
    // Loading and cursor
    // ========================================================================

    /// Load a transfer file; check `is_healthy()` afterwards
    fn load_file(&mut self, path: &str) -> bool {
        self.inner.load_file(path);
        self.inner.is_healthy()
    }

    /// Load transfer table text; check `is_healthy()` afterwards
    fn load_text(&mut self, text: &str) -> bool {
        self.inner.load_text(text);
        self.inner.is_healthy()
    }

    /// Move to the next operation, returns the health flag
    fn advance(&mut self) -> bool {
        self.inner.advance();
        self.inner.is_healthy()
    }

    fn is_healthy(&self) -> bool {
        self.inner.is_healthy()
    }

    fn last_error(&self) -> Option<String> {
        self.inner.last_error().map(|e| e.to_string())
    }

    fn cursor_index(&self) -> Option<usize> {
        self.inner.cursor_index()
    }

    fn total_size(&self) -> usize {
        self.inner.total_size()
    }

    /// One of `Unloaded`, `Loaded`, `Exhausted`, `LoadFailed`
    fn state(&self) -> String {
        format!("{:?}", self.inner.state())
    }

    // ========================================================================
    // Per-step queries
    // ========================================================================

    fn source_container(&self) -> Option<String> {
        self.inner
            .current()
            .map(|op| op.source_container().to_string())
    }

    fn source_well(&self) -> Option<String> {
        self.inner.source_well().map(|w| w.to_string())
    }

    fn destination_well(&self) -> Option<String> {
        self.inner.destination_well().map(|w| w.to_string())
    }

    /// Volume in microliters
    fn volume(&self) -> Option<f64> {
        self.inner.volume().map(|v| v.as_f64())
    }

    fn tip_supply_position(&self) -> Option<(u8, u8)> {
        position_tuple(self.inner.tip_supply_position())
    }

    fn tip_placement_position(&self) -> Option<(u8, u8)> {
        position_tuple(self.inner.tip_placement_position())
    }

    fn needs_new_tip(&self) -> bool {
        self.inner.needs_new_tip()
    }

    fn should_return_tip(&self) -> bool {
        self.inner.should_return_tip()
    }

    fn is_source_changing(&self) -> bool {
        self.inner.is_source_changing()
    }

    fn batch_sizes(&self) -> Vec<usize> {
        self.inner.batch_sizes().to_vec()
    }

    fn batch_volume_constant(&self) -> Vec<bool> {
        self.inner.batch_volume_constant().to_vec()
    }

    fn is_current_batch_volume_constant(&self) -> bool {
        self.inner.is_current_batch_volume_constant()
    }

    // ========================================================================
    // Tip state
    // ========================================================================

    /// Take a tip and fill a slot; returns the `(taken, placed)` positions
    fn commit_tip_state(&mut self) -> (Option<(u8, u8)>, Option<(u8, u8)>) {
        let commit = self.inner.commit_tip_state();
        (position_tuple(commit.taken), position_tuple(commit.placed))
    }

    fn replace_supply_rack(&mut self) {
        self.inner.replace_supply_rack();
    }

    fn replace_placement_rack(&mut self) {
        self.inner.replace_placement_rack();
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    fn save_checkpoint(&self, path: &str) -> PyResult<()> {
        self.inner.save_checkpoint(path).map_err(|e| {
            PyErr::new::<PyRuntimeError, _>(format!("Failed to save checkpoint: {}", e))
        })
    }

    fn restore_checkpoint(&mut self, path: &str) -> PyResult<()> {
        self.inner.restore_checkpoint(path).map_err(|e| {
            PyErr::new::<PyRuntimeError, _>(format!("Failed to restore checkpoint: {}", e))
        })
    }
}
