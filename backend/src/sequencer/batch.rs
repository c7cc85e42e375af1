//! Per-source-container batch statistics
//!
//! A batch is a maximal run of consecutive operations that share a source
//! container. Statistics are computed once per load in a single pass and
//! never change afterwards.
//!
//! The operation list is assumed to be grouped by container already (the
//! parsers sort it); nothing here re-orders operations. A container that
//! appears in two separate runs therefore forms two batches.

use crate::models::Operation;
use serde::{Deserialize, Serialize};

/// Batch sizes and volume uniformity, parallel vectors indexed by batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    sizes: Vec<usize>,
    volume_constant: Vec<bool>,
    /// Batch index of every operation
    batch_of: Vec<usize>,
}

impl BatchStats {
    /// Scan `operations` once
    ///
    /// # Example
    /// ```
    /// use transfer_sequencer_core_rs::{ContainerId, Operation, Volume, Well};
    /// use transfer_sequencer_core_rs::sequencer::BatchStats;
    ///
    /// let op = |c: &str, ul: i64| Operation::new(
    ///     ContainerId::new(c), Well::A1, Volume::from_thousandths(ul * 1000), Well::A1, true,
    /// );
    /// let stats = BatchStats::compute(&[op("1", 10), op("1", 10), op("2", 8)]);
    /// assert_eq!(stats.sizes(), &[2, 1]);
    /// assert_eq!(stats.volume_constant(), &[true, true]);
    /// ```
    pub fn compute(operations: &[Operation]) -> Self {
        let mut stats = BatchStats::default();
        let mut batch_start: Option<&Operation> = None;

        for op in operations {
            match batch_start {
                Some(first) if first.source_container() == op.source_container() => {
                    let last = stats.sizes.len() - 1;
                    stats.sizes[last] += 1;
                    if op.volume() != first.volume() {
                        stats.volume_constant[last] = false;
                    }
                }
                _ => {
                    stats.sizes.push(1);
                    stats.volume_constant.push(true);
                    batch_start = Some(op);
                }
            }
            stats.batch_of.push(stats.sizes.len() - 1);
        }

        stats
    }

    /// Run lengths of consecutive equal source containers
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Whether every volume within each batch is the same
    pub fn volume_constant(&self) -> &[bool] {
        &self.volume_constant
    }

    /// Sum of all batch sizes
    pub fn total(&self) -> usize {
        self.sizes.iter().sum()
    }

    /// Number of batches
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Batch containing the operation at `index`
    pub fn batch_of(&self, index: usize) -> Option<usize> {
        self.batch_of.get(index).copied()
    }
}
