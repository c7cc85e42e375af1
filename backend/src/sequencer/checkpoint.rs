//! Checkpoint - save/restore run progress
//!
//! A run interrupted mid-plate (instrument paused, host restarted) resumes
//! from a snapshot of the cursor and both rack counters. The snapshot also
//! carries a SHA-256 fingerprint of the operation list, so progress is only
//! ever restored onto the same list it was taken from.
//!
//! # Critical Invariants
//!
//! - **List matching**: restore fails unless the loaded operations hash to
//!   the recorded fingerprint
//! - **Rack bounds**: restored counters never exceed rack capacity
//! - **Atomic restore**: on any failure the sequencer is left untouched

use crate::error::SequencerError;
use crate::sequencer::engine::TransferSequencer;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Progress of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencerSnapshot {
    /// Number of `advance()` calls since load
    pub advanced: usize,

    /// Tips consumed from the supply rack
    pub supply_used: u8,

    /// Slots filled on the placement rack
    pub placement_used: u8,

    /// SHA-256 of the canonical JSON of the operation list
    pub operations_hash: String,
}

/// Compute deterministic SHA256 hash of any serialisable value
///
/// Object keys are sorted recursively before hashing so the digest does not
/// depend on field or map ordering.
pub fn compute_content_hash<T: Serialize>(value: &T) -> Result<String, SequencerError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(value)
        .map_err(|e| SequencerError::Checkpoint(format!("serialization failed: {}", e)))?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value))
        .map_err(|e| SequencerError::Checkpoint(format!("serialization failed: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

impl TransferSequencer {
    /// Capture current progress
    ///
    /// # Errors
    /// `NotLoaded` without a loaded operation list.
    pub fn snapshot(&self) -> Result<SequencerSnapshot, SequencerError> {
        let operations = self.operations().ok_or(SequencerError::NotLoaded)?;
        Ok(SequencerSnapshot {
            advanced: self.advanced(),
            supply_used: self.supply_rack().used_count(),
            placement_used: self.placement_rack().used_count(),
            operations_hash: compute_content_hash(&operations)?,
        })
    }

    /// Resume from a snapshot taken on the same operation list
    ///
    /// # Errors
    /// - `NotLoaded` without a loaded list
    /// - `Checkpoint` on fingerprint mismatch or out-of-range counters
    pub fn restore(&mut self, snapshot: &SequencerSnapshot) -> Result<(), SequencerError> {
        let operations = self.operations().ok_or(SequencerError::NotLoaded)?;
        let hash = compute_content_hash(&operations)?;
        if hash != snapshot.operations_hash {
            return Err(SequencerError::Checkpoint(
                "snapshot was taken from a different transfer list".to_string(),
            ));
        }
        self.restore_progress(
            snapshot.advanced,
            snapshot.supply_used,
            snapshot.placement_used,
        )?;
        tracing::info!(cursor = ?self.cursor_index(), "Progress restored from checkpoint");
        Ok(())
    }

    /// Write a snapshot as JSON through the storage collaborator
    pub fn save_checkpoint(&self, path: &str) -> Result<(), SequencerError> {
        let snapshot = self.snapshot()?;
        let json = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| SequencerError::Checkpoint(e.to_string()))?;
        self.storage().write(path, &json)
    }

    /// Read a JSON snapshot through the storage collaborator and restore it
    pub fn restore_checkpoint(&mut self, path: &str) -> Result<(), SequencerError> {
        let json = self.storage().read(path)?;
        let snapshot: SequencerSnapshot = serde_json::from_str(&json)
            .map_err(|e| SequencerError::Checkpoint(e.to_string()))?;
        self.restore(&snapshot)
    }
}
