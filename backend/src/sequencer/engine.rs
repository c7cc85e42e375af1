//! Transfer sequencer - step-by-step tip and plate decisions
//!
//! Walks an ordered operation list with a one-step lookahead and answers the
//! questions a liquid-handling driver asks at every step: which wells, how
//! much, does this step need a fresh tip, should the tip be discarded
//! afterwards, is the source plate about to change, and where the next tip
//! comes from and goes to.
//!
//! # State machine
//!
//! ```text
//! Unloaded --load--> Loaded --advance past end--> Exhausted
//!     |                 ^
//!     +--load fails--> LoadFailed --(re)load--+
//! ```
//!
//! # Driver protocol
//!
//! Per step: `advance()`, check `is_healthy()`, read the decisions (or take a
//! [`StepPlan`] with `peek_step()`), perform the physical action, then commit
//! tip state (`commit_step(&plan)` or `commit_tip_state()`). Reading peek
//! queries after a commit yields the positions for the *next* tip, so plans
//! are stamped and a stale plan is refused.
//!
//! # Error policy
//!
//! `load*` and `advance` never return errors: failures set the health flag,
//! are stored in `last_error()` and are reported to the [`Logger`]. Rack
//! boundaries are reported as `None`, not as errors.
//!
//! # Example
//!
//! ```rust
//! use transfer_sequencer_core_rs::{SequencerConfig, TransferSequencer};
//!
//! let mut seq = TransferSequencer::new(SequencerConfig::default()).unwrap();
//! seq.load_text("1,A1,10,B1\n1,A2,10,B2\n2,A1,5,B3\n");
//! assert!(seq.is_healthy());
//! assert_eq!(seq.batch_sizes(), &[2, 1]);
//!
//! seq.advance();
//! assert_eq!(seq.source_well().unwrap().to_string(), "A1");
//! assert!(seq.needs_new_tip());
//! assert!(seq.should_return_tip());
//! assert!(!seq.is_source_changing());
//! ```

use crate::error::SequencerError;
use crate::io::{FsStorage, Logger, TextStorage, TracingLogger};
use crate::models::{Operation, Volume, Well};
use crate::parsers::ParseMode;
use crate::rack::{Corner, RackOrigin, TipPosition, TipRack, RACK_SIZE};
use crate::sequencer::batch::BatchStats;
use crate::sequencer::step::{StepPlan, StepStamp, TipCommit};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

fn full_rack() -> u8 {
    RACK_SIZE
}

/// Run configuration
///
/// Deserialisable from JSON; every field has a default.
///
/// ```rust
/// use transfer_sequencer_core_rs::SequencerConfig;
///
/// let config: SequencerConfig =
///     serde_json::from_str(r#"{"mode": "adapter:truseq", "tip_origin": {"row": 1, "column": 1}}"#)
///         .unwrap();
/// assert_eq!(config.supply_capacity, 96);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencerConfig {
    /// Schema of the transfer files this run loads
    #[serde(default)]
    pub mode: ParseMode,

    /// Rack corner convention shared by both racks
    #[serde(default)]
    pub tip_origin: RackOrigin,

    /// Tips in the supply rack at start
    #[serde(default = "full_rack")]
    pub supply_capacity: u8,

    /// Empty slots in the placement rack at start
    #[serde(default = "full_rack")]
    pub placement_capacity: u8,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            mode: ParseMode::default(),
            tip_origin: RackOrigin::default(),
            supply_capacity: RACK_SIZE,
            placement_capacity: RACK_SIZE,
        }
    }
}

/// Lifecycle of a sequencer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequencerState {
    /// Nothing loaded yet
    Unloaded,
    /// Operation list loaded, steps remaining or in progress
    Loaded,
    /// Advanced past the last operation
    Exhausted,
    /// Last load failed; see `last_error()`
    LoadFailed,
}

/// Step-by-step decision engine for one run
pub struct TransferSequencer {
    config: SequencerConfig,
    supply: TipRack,
    placement: TipRack,

    /// `None` until a load succeeds
    operations: Option<Vec<Operation>>,
    /// Number of `advance()` calls since load; the current operation is
    /// `operations[advanced - 1]`, the lookahead `operations[advanced]`
    advanced: usize,
    batches: BatchStats,
    /// Bumped on every load so plans from an older list are refused
    generation: u64,
    /// Tip commits so far; a commit at a full rack moves no counter
    commits: u64,

    state: SequencerState,
    healthy: bool,
    last_error: Option<SequencerError>,

    storage: Arc<dyn TextStorage>,
    logger: Arc<dyn Logger>,
}

impl std::fmt::Debug for TransferSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferSequencer")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("advanced", &self.advanced)
            .field("supply", &self.supply)
            .field("placement", &self.placement)
            .field("healthy", &self.healthy)
            .finish()
    }
}

impl TransferSequencer {
    /// Create a sequencer with filesystem storage and tracing logger
    ///
    /// # Errors
    /// - `InvalidOrigin` if the tip origin is not a rack corner
    /// - `InvalidConfig` if a rack capacity exceeds 96
    pub fn new(config: SequencerConfig) -> Result<Self, SequencerError> {
        let corner = Corner::try_from(config.tip_origin)?;
        let supply = TipRack::new(config.supply_capacity, corner)?;
        let placement = TipRack::new(config.placement_capacity, corner)?;

        Ok(Self {
            config,
            supply,
            placement,
            operations: None,
            advanced: 0,
            batches: BatchStats::default(),
            generation: 0,
            commits: 0,
            state: SequencerState::Unloaded,
            healthy: true,
            last_error: None,
            storage: Arc::new(FsStorage),
            logger: Arc::new(TracingLogger),
        })
    }

    /// Replace the text storage collaborator (builder pattern)
    pub fn with_storage(mut self, storage: Arc<dyn TextStorage>) -> Self {
        self.storage = storage;
        self
    }

    /// Replace the logger collaborator (builder pattern)
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    /// Shared handle to the storage collaborator (journals, checkpoints)
    pub fn storage(&self) -> Arc<dyn TextStorage> {
        Arc::clone(&self.storage)
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Load an already ordered operation list
    ///
    /// Resets the cursor and recomputes batch statistics. Rack counters are
    /// left alone: physical racks do not refill when a new file is loaded.
    pub fn load(&mut self, operations: Vec<Operation>) {
        self.batches = BatchStats::compute(&operations);
        tracing::debug!(
            operations = operations.len(),
            batches = self.batches.len(),
            "Transfer list loaded"
        );
        self.operations = Some(operations);
        self.advanced = 0;
        self.generation += 1;
        self.state = SequencerState::Loaded;
        self.healthy = true;
        self.last_error = None;
    }

    /// Parse `text` with the configured mode and load the result
    ///
    /// Parse failures move the sequencer to `LoadFailed`.
    pub fn load_text(&mut self, text: &str) {
        match self.config.mode.parse(text) {
            Ok(operations) => self.load(operations),
            Err(err) => self.fail_load(err),
        }
    }

    /// Read `path` through the storage collaborator, then `load_text`
    pub fn load_file(&mut self, path: &str) {
        match self.storage.read(path) {
            Ok(text) => self.load_text(&text),
            Err(err) => self.fail_load(err),
        }
    }

    fn fail_load(&mut self, err: SequencerError) {
        self.operations = None;
        self.advanced = 0;
        self.batches = BatchStats::default();
        self.generation += 1;
        self.state = SequencerState::LoadFailed;
        self.record_error(err);
    }

    fn record_error(&mut self, err: SequencerError) {
        self.healthy = false;
        self.logger.report(&err.to_string());
        self.last_error = Some(err);
    }

    // ========================================================================
    // Cursor
    // ========================================================================

    /// Move to the next operation
    ///
    /// Without a loaded list the failure is recorded (`NotLoaded`) instead of
    /// being returned. Advancing past the last operation enters `Exhausted`;
    /// further calls are no-ops.
    pub fn advance(&mut self) {
        if self.operations.is_none() {
            self.record_error(SequencerError::NotLoaded);
            return;
        }

        if self.advanced <= self.total_size() {
            self.advanced += 1;
        }
        self.state = if self.advanced > self.total_size() {
            SequencerState::Exhausted
        } else {
            SequencerState::Loaded
        };
        tracing::debug!(cursor = ?self.cursor_index(), state = ?self.state, "Advanced");
    }

    /// Index of the current operation; `None` before the first advance
    pub fn cursor_index(&self) -> Option<usize> {
        self.advanced.checked_sub(1)
    }

    /// Sum of batch sizes (the number of loaded operations)
    pub fn total_size(&self) -> usize {
        self.batches.total()
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// False after a failed load or advance until the next successful load
    pub fn is_healthy(&self) -> bool {
        self.healthy
    }

    pub fn last_error(&self) -> Option<&SequencerError> {
        self.last_error.as_ref()
    }

    pub fn operations(&self) -> Option<&[Operation]> {
        self.operations.as_deref()
    }

    /// Operation being executed
    pub fn current(&self) -> Option<&Operation> {
        let index = self.cursor_index()?;
        self.operations.as_ref()?.get(index)
    }

    /// Lookahead operation
    pub fn next(&self) -> Option<&Operation> {
        if self.advanced >= self.total_size() {
            return None;
        }
        self.operations.as_ref()?.get(self.advanced)
    }

    fn is_last(&self) -> bool {
        let total = self.total_size();
        total > 0 && self.cursor_index() == Some(total - 1)
    }

    // ========================================================================
    // Per-step queries
    // ========================================================================

    pub fn source_well(&self) -> Option<Well> {
        self.current().map(Operation::source_well)
    }

    pub fn destination_well(&self) -> Option<Well> {
        self.current().map(Operation::destination_well)
    }

    pub fn volume(&self) -> Option<Volume> {
        self.current().map(Operation::volume)
    }

    /// Where the next fresh tip is, without taking it
    pub fn tip_supply_position(&self) -> Option<TipPosition> {
        self.supply.peek_next()
    }

    /// Where the used tip goes, without placing it
    pub fn tip_placement_position(&self) -> Option<TipPosition> {
        self.placement.peek_next_empty()
    }

    /// The current operation's tip hint, as decided by the parser
    pub fn needs_new_tip(&self) -> bool {
        self.current().is_some_and(Operation::prefer_new_tip)
    }

    /// Discard the tip after this step unless the next operation reuses it
    pub fn should_return_tip(&self) -> bool {
        self.is_last() || self.next().is_some_and(Operation::prefer_new_tip)
    }

    /// The next operation draws from a different container
    pub fn is_source_changing(&self) -> bool {
        match (self.current(), self.next()) {
            (Some(current), Some(next)) => current.source_container() != next.source_container(),
            _ => false,
        }
    }

    pub fn batch_sizes(&self) -> &[usize] {
        self.batches.sizes()
    }

    pub fn batch_volume_constant(&self) -> &[bool] {
        self.batches.volume_constant()
    }

    /// Batch holding the current operation
    pub fn current_batch(&self) -> Option<usize> {
        self.batches.batch_of(self.cursor_index()?)
    }

    /// Every transfer from the current container uses the same volume
    pub fn is_current_batch_volume_constant(&self) -> bool {
        self.current_batch()
            .and_then(|b| self.batches.volume_constant().get(b).copied())
            .unwrap_or(false)
    }

    // ========================================================================
    // Racks
    // ========================================================================

    pub fn supply_rack(&self) -> &TipRack {
        &self.supply
    }

    pub fn placement_rack(&self) -> &TipRack {
        &self.placement
    }

    /// Take a tip and fill a slot, advancing both racks in lockstep
    pub fn commit_tip_state(&mut self) -> TipCommit {
        let commit = TipCommit {
            taken: self.supply.consume(),
            placed: self.placement.place(),
        };
        self.commits += 1;
        if commit.taken.is_none() {
            tracing::warn!(used = self.supply.used_count(), "Supply rack exhausted");
        }
        if commit.placed.is_none() {
            tracing::warn!(used = self.placement.used_count(), "Placement rack full");
        }
        commit
    }

    /// Operator loaded a fresh supply rack
    pub fn replace_supply_rack(&mut self) {
        tracing::info!("Supply rack replaced");
        self.supply.replace();
    }

    /// Operator emptied the placement rack
    pub fn replace_placement_rack(&mut self) {
        tracing::info!("Placement rack replaced");
        self.placement.replace();
    }

    pub(crate) fn restore_progress(
        &mut self,
        advanced: usize,
        supply_used: u8,
        placement_used: u8,
    ) -> Result<(), SequencerError> {
        if self.operations.is_none() {
            return Err(SequencerError::NotLoaded);
        }
        if advanced > self.total_size() + 1 {
            return Err(SequencerError::Checkpoint(format!(
                "cursor {} beyond {} operations",
                advanced,
                self.total_size()
            )));
        }
        let supply = self.supply.clone().with_used_count(supply_used)?;
        let placement = self.placement.clone().with_used_count(placement_used)?;

        self.supply = supply;
        self.placement = placement;
        self.advanced = advanced;
        self.generation += 1;
        self.state = if advanced > self.total_size() {
            SequencerState::Exhausted
        } else {
            SequencerState::Loaded
        };
        Ok(())
    }

    pub(crate) fn advanced(&self) -> usize {
        self.advanced
    }

    // ========================================================================
    // Step plans
    // ========================================================================

    fn stamp(&self) -> StepStamp {
        StepStamp {
            generation: self.generation,
            advanced: self.advanced,
            commits: self.commits,
            supply_used: self.supply.used_count(),
            placement_used: self.placement.used_count(),
        }
    }

    /// Snapshot every decision for the current operation
    ///
    /// Returns `None` when there is no current operation (before the first
    /// advance, after the last one, or without a loaded list).
    pub fn peek_step(&self) -> Option<StepPlan> {
        let current = self.current()?;
        let step = self.cursor_index()?;
        let batch = self.current_batch()?;

        Some(StepPlan {
            step,
            source_container: current.source_container().clone(),
            source_well: current.source_well(),
            destination_well: current.destination_well(),
            volume: current.volume(),
            tip_supply: self.tip_supply_position(),
            tip_placement: self.tip_placement_position(),
            needs_new_tip: self.needs_new_tip(),
            return_tip: self.should_return_tip(),
            source_changing: self.is_source_changing(),
            batch,
            batch_volume_constant: self.is_current_batch_volume_constant(),
            stamp: self.stamp(),
        })
    }

    /// Commit tip state for a plan taken from the current state
    ///
    /// A plan can be committed once, even when both racks are at their
    /// limit and no rack counter moves.
    ///
    /// # Errors
    /// `StaleStep` if anything moved since the plan was peeked; nothing is
    /// mutated in that case.
    pub fn commit_step(&mut self, plan: &StepPlan) -> Result<TipCommit, SequencerError> {
        if plan.stamp != self.stamp() {
            return Err(SequencerError::StaleStep);
        }
        let commit = self.commit_tip_state();
        tracing::debug!(
            step = plan.step,
            taken = ?commit.taken,
            placed = ?commit.placed,
            "Tip state committed"
        );
        Ok(commit)
    }
}
