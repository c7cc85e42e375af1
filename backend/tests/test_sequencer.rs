//! Tests for TransferSequencer
//!
//! Critical invariants tested:
//! - Batch statistics: sizes sum to the list length, volume uniformity per batch
//! - Lookahead decisions: tip return and source change follow the next operation
//! - Error policy: load/advance failures set the health flag and reach the logger
//! - Step plans: a plan is only committed against the state it was taken from

use std::sync::Arc;
use transfer_sequencer_core_rs::rack::TipPosition;
use transfer_sequencer_core_rs::{
    ContainerId, MemoryLogger, MemoryStorage, Operation, RackOrigin, SequencerConfig,
    SequencerError, SequencerState, TransferSequencer, Volume, Well,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn create_sequencer() -> TransferSequencer {
    TransferSequencer::new(SequencerConfig::default()).unwrap()
}

fn op(container: &str, volume: i64, prefer_new_tip: bool) -> Operation {
    Operation::new(
        ContainerId::new(container),
        Well::A1,
        Volume::from_thousandths(volume * 1000),
        Well::A1,
        prefer_new_tip,
    )
}

/// Advance once per operation, collecting `f` at every step
fn walk<T>(seq: &mut TransferSequencer, f: impl Fn(&TransferSequencer) -> T) -> Vec<T> {
    let mut out = Vec::new();
    for _ in 0..seq.total_size() {
        seq.advance();
        out.push(f(&*seq));
    }
    out
}

// ============================================================================
// Batch statistics
// ============================================================================

#[test]
fn test_batch_sizes_from_containers() {
    let mut seq = create_sequencer();
    seq.load(vec![op("1", 10, true), op("1", 10, true), op("2", 8, true)]);

    assert_eq!(seq.batch_sizes(), &[2, 1]);
    assert_eq!(seq.total_size(), 3);
    assert_eq!(seq.state(), SequencerState::Loaded);
}

#[test]
fn test_batch_volume_constant() {
    let mut seq = create_sequencer();

    seq.load(vec![op("1", 10, true), op("1", 10, true), op("2", 8, true)]);
    assert_eq!(seq.batch_volume_constant(), &[true, true]);

    seq.load(vec![op("1", 10, true), op("1", 5, true), op("2", 8, true)]);
    assert_eq!(seq.batch_volume_constant(), &[false, true]);
}

#[test]
fn test_current_batch_follows_cursor() {
    let mut seq = create_sequencer();
    seq.load(vec![op("1", 10, true), op("1", 5, true), op("2", 8, true)]);

    let batches = walk(&mut seq, |s| (s.current_batch(), s.is_current_batch_volume_constant()));
    assert_eq!(
        batches,
        vec![(Some(0), false), (Some(0), false), (Some(1), true)]
    );
}

// ============================================================================
// Cursor and lookahead
// ============================================================================

#[test]
fn test_queries_before_first_advance() {
    let mut seq = create_sequencer();
    seq.load(vec![op("1", 10, true)]);

    assert_eq!(seq.cursor_index(), None);
    assert!(seq.current().is_none());
    assert!(seq.next().is_some());
    assert_eq!(seq.source_well(), None);
    assert!(!seq.needs_new_tip());
    assert!(!seq.is_source_changing());
    assert!(seq.peek_step().is_none());
}

#[test]
fn test_should_return_tip_follows_next_operation() {
    let mut seq = create_sequencer();
    seq.load(vec![op("1", 10, true), op("1", 10, false), op("1", 10, true)]);

    let decisions = walk(&mut seq, |s| (s.needs_new_tip(), s.should_return_tip()));
    assert_eq!(decisions, vec![(true, false), (false, true), (true, true)]);
}

#[test]
fn test_is_source_changing_at_batch_boundary() {
    let mut seq = create_sequencer();
    seq.load(vec![op("1", 10, true), op("1", 10, true), op("2", 10, true)]);

    let changing = walk(&mut seq, TransferSequencer::is_source_changing);
    assert_eq!(changing, vec![false, true, false]);
}

#[test]
fn test_advance_past_end_exhausts() {
    let mut seq = create_sequencer();
    seq.load(vec![op("1", 10, true), op("2", 10, true)]);

    seq.advance();
    seq.advance();
    assert_eq!(seq.state(), SequencerState::Loaded);
    assert!(seq.should_return_tip());

    seq.advance();
    assert_eq!(seq.state(), SequencerState::Exhausted);
    assert!(seq.current().is_none());
    assert_eq!(seq.cursor_index(), Some(2));

    seq.advance();
    assert_eq!(seq.state(), SequencerState::Exhausted);
    assert_eq!(seq.cursor_index(), Some(2));
    assert!(seq.is_healthy());
}

#[test]
fn test_empty_list_exhausts_on_first_advance() {
    let mut seq = create_sequencer();
    seq.load(Vec::new());

    assert_eq!(seq.total_size(), 0);
    seq.advance();
    assert_eq!(seq.state(), SequencerState::Exhausted);
    assert!(!seq.should_return_tip());
}

#[test]
fn test_reload_resets_cursor_but_not_racks() {
    let mut seq = create_sequencer();
    seq.load(vec![op("1", 10, true)]);
    seq.advance();
    seq.commit_tip_state();

    seq.load(vec![op("2", 10, true)]);

    assert_eq!(seq.cursor_index(), None);
    assert_eq!(seq.supply_rack().used_count(), 1);
    assert_eq!(seq.placement_rack().used_count(), 1);
}

// ============================================================================
// Loading through collaborators
// ============================================================================

#[test]
fn test_load_file_through_storage() {
    let storage = MemoryStorage::new();
    storage.insert("run.csv", "2,A1,5,B1\n1,A1,10,A1\n1,B1,10,A2\n");
    let mut seq = create_sequencer().with_storage(Arc::new(storage));

    seq.load_file("run.csv");

    assert!(seq.is_healthy());
    assert_eq!(seq.batch_sizes(), &[2, 1]);
    seq.advance();
    assert_eq!(seq.volume().map(|v| v.to_string()), Some("10".to_string()));
}

#[test]
fn test_missing_file_sets_load_failed() {
    let logger = MemoryLogger::new();
    let mut seq = create_sequencer()
        .with_storage(Arc::new(MemoryStorage::new()))
        .with_logger(Arc::new(logger.clone()));

    seq.load_file("missing.csv");

    assert_eq!(seq.state(), SequencerState::LoadFailed);
    assert!(!seq.is_healthy());
    assert!(matches!(seq.last_error(), Some(SequencerError::Io { path, .. }) if path == "missing.csv"));
    assert_eq!(logger.messages().len(), 1);
    assert!(logger.messages()[0].contains("missing.csv"));
}

#[test]
fn test_parse_failure_then_recovery() {
    let logger = MemoryLogger::new();
    let mut seq = create_sequencer().with_logger(Arc::new(logger.clone()));

    seq.load_text("1,A1,10,B1\n1,Z9,10,B2\n");
    assert_eq!(seq.state(), SequencerState::LoadFailed);
    assert!(matches!(seq.last_error(), Some(SequencerError::Parse { line: 2, .. })));
    assert!(seq.operations().is_none());

    seq.advance();
    assert_eq!(seq.last_error(), Some(&SequencerError::NotLoaded));
    assert_eq!(logger.messages().len(), 2);

    seq.load_text("1,A1,10,B1\n");
    assert_eq!(seq.state(), SequencerState::Loaded);
    assert!(seq.is_healthy());
    assert_eq!(seq.last_error(), None);
}

// ============================================================================
// Tip state
// ============================================================================

#[test]
fn test_tip_positions_for_default_origin() {
    let mut seq = create_sequencer();
    seq.load(vec![op("1", 10, true), op("1", 10, true)]);
    seq.advance();

    let first = TipPosition { row: 1, column: 1 };
    assert_eq!(seq.tip_supply_position(), Some(first));
    assert_eq!(seq.tip_placement_position(), Some(first));

    let commit = seq.commit_tip_state();
    assert_eq!(commit.taken, Some(first));
    assert_eq!(commit.placed, Some(first));
    assert!(commit.is_complete());
    assert_eq!(seq.tip_supply_position(), Some(TipPosition { row: 2, column: 1 }));
}

#[test]
fn test_supply_exhaustion_and_replacement() {
    let config = SequencerConfig {
        tip_origin: RackOrigin { row: 1, column: 1 },
        supply_capacity: 1,
        ..SequencerConfig::default()
    };
    let mut seq = TransferSequencer::new(config).unwrap();
    seq.load(vec![op("1", 10, true), op("1", 10, true)]);

    seq.advance();
    assert!(seq.commit_tip_state().is_complete());

    seq.advance();
    assert_eq!(seq.tip_supply_position(), None);
    let commit = seq.commit_tip_state();
    assert_eq!(commit.taken, None);
    assert_eq!(commit.placed, Some(TipPosition { row: 7, column: 12 }));
    assert_eq!(seq.supply_rack().used_count(), 1);

    seq.replace_supply_rack();
    assert_eq!(seq.tip_supply_position(), Some(TipPosition { row: 8, column: 12 }));
}

// ============================================================================
// Step plans
// ============================================================================

#[test]
fn test_step_plan_matches_queries() {
    let mut seq = create_sequencer();
    seq.load_text("1,A1,10,B1\n1,A2,10,B2\n2,C3,5,B3\n");
    seq.advance();
    seq.advance();

    let plan = seq.peek_step().unwrap();
    assert_eq!(plan.step, 1);
    assert_eq!(plan.source_container, ContainerId::Number(1));
    assert_eq!(Some(plan.source_well), seq.source_well());
    assert_eq!(Some(plan.destination_well), seq.destination_well());
    assert_eq!(plan.tip_supply, seq.tip_supply_position());
    assert!(plan.needs_new_tip);
    assert!(plan.return_tip);
    assert!(plan.source_changing);
    assert_eq!(plan.batch, 0);
    assert!(plan.batch_volume_constant);
}

#[test]
fn test_commit_step_applies_once() {
    let mut seq = create_sequencer();
    seq.load(vec![op("1", 10, true), op("1", 10, true)]);
    seq.advance();

    let plan = seq.peek_step().unwrap();
    let commit = seq.commit_step(&plan).unwrap();
    assert_eq!(commit.taken, plan.tip_supply);
    assert_eq!(commit.placed, plan.tip_placement);

    assert_eq!(seq.commit_step(&plan), Err(SequencerError::StaleStep));
    assert_eq!(seq.supply_rack().used_count(), 1);
}

#[test]
fn test_stale_plan_after_advance_or_reload() {
    let mut seq = create_sequencer();
    seq.load(vec![op("1", 10, true), op("1", 10, true)]);
    seq.advance();

    let plan = seq.peek_step().unwrap();
    seq.advance();
    assert_eq!(seq.commit_step(&plan), Err(SequencerError::StaleStep));

    let plan = seq.peek_step().unwrap();
    seq.load(vec![op("1", 10, true), op("1", 10, true)]);
    seq.advance();
    seq.advance();
    assert_eq!(seq.commit_step(&plan), Err(SequencerError::StaleStep));
    assert_eq!(seq.supply_rack().used_count(), 0);
}

#[test]
fn test_stale_plan_after_rack_swap() {
    let mut seq = create_sequencer();
    seq.load(vec![op("1", 10, true), op("1", 10, true)]);
    seq.advance();
    seq.commit_tip_state();

    let plan = seq.peek_step().unwrap();
    seq.replace_placement_rack();
    assert_eq!(seq.commit_step(&plan), Err(SequencerError::StaleStep));
}

#[test]
fn test_plan_committed_once_at_rack_limits() {
    let config = SequencerConfig {
        supply_capacity: 0,
        placement_capacity: 0,
        ..SequencerConfig::default()
    };
    let mut seq = TransferSequencer::new(config).unwrap();
    seq.load(vec![op("1", 10, true)]);
    seq.advance();

    let plan = seq.peek_step().unwrap();
    assert_eq!(plan.tip_supply, None);
    assert_eq!(plan.tip_placement, None);

    let commit = seq.commit_step(&plan).unwrap();
    assert!(commit.taken.is_none() && commit.placed.is_none());
    assert_eq!(seq.commit_step(&plan), Err(SequencerError::StaleStep));
}
