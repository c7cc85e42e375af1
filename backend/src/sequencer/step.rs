//! Step snapshots
//!
//! A `StepPlan` freezes every decision for the current step together with a
//! stamp of the state it was read from. Committing a plan after the state
//! moved on (another commit, an advance, a reload, a rack swap) is rejected,
//! which turns the peek → act → commit ordering into a checked contract.

use crate::models::{ContainerId, Volume, Well};
use crate::rack::TipPosition;
use serde::Serialize;

/// State a plan was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StepStamp {
    pub generation: u64,
    pub advanced: usize,
    pub commits: u64,
    pub supply_used: u8,
    pub placement_used: u8,
}

/// Everything a driver needs to execute one operation
///
/// Not `Clone`: a plan is meant to be committed at most once, and the
/// sequencer refuses a second commit of the same plan.
#[derive(Debug, PartialEq, Serialize)]
pub struct StepPlan {
    /// 0-based index of the operation
    pub step: usize,
    pub source_container: ContainerId,
    pub source_well: Well,
    pub destination_well: Well,
    pub volume: Volume,
    /// Fresh tip position, `None` when the supply rack is exhausted
    pub tip_supply: Option<TipPosition>,
    /// Slot for the used tip, `None` when the placement rack is full
    pub tip_placement: Option<TipPosition>,
    pub needs_new_tip: bool,
    pub return_tip: bool,
    pub source_changing: bool,
    pub batch: usize,
    pub batch_volume_constant: bool,
    #[serde(skip)]
    pub(crate) stamp: StepStamp,
}

/// Positions actually used by a tip commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TipCommit {
    /// Position consumed from the supply rack
    pub taken: Option<TipPosition>,
    /// Position filled on the placement rack
    pub placed: Option<TipPosition>,
}

impl TipCommit {
    /// Both racks moved
    pub fn is_complete(&self) -> bool {
        self.taken.is_some() && self.placed.is_some()
    }
}
