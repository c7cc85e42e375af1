//! `transfer-seq plan` - dry-run driver
//!
//! Walks the loaded list with the same peek → commit → advance protocol a
//! real instrument driver follows, swapping racks whenever one runs out.

use anyhow::{bail, Context, Result};
use transfer_sequencer_core_rs::{
    RunJournal, SequencerConfig, StepPlan, TipPosition, TransferSequencer,
};

pub fn run_plan_command(file: &str, config: SequencerConfig, journal: Option<&str>) -> Result<()> {
    let mut seq = TransferSequencer::new(config)?;
    seq.load_file(file);
    if let Some(err) = seq.last_error() {
        bail!("{}: {}", file, err);
    }
    tracing::info!(file, operations = seq.total_size(), "Planning run");

    let mut journal = journal
        .map(|path| RunJournal::create(seq.storage(), path))
        .transpose()
        .context("Failed to create journal")?;

    let mut swaps = 0usize;
    loop {
        seq.advance();
        if seq.current().is_none() {
            break;
        }

        if seq.tip_supply_position().is_none() {
            println!("-- replace supply rack");
            seq.replace_supply_rack();
            swaps += 1;
        }
        if seq.tip_placement_position().is_none() {
            println!("-- empty placement rack");
            seq.replace_placement_rack();
            swaps += 1;
        }

        let Some(plan) = seq.peek_step() else {
            break;
        };
        println!("{}", describe(&plan));

        let commit = seq.commit_step(&plan)?;
        if let Some(journal) = journal.as_mut() {
            journal.record(&plan, &commit)?;
        }
    }

    println!(
        "{} steps, {} batches, {} rack swaps",
        seq.total_size(),
        seq.batch_sizes().len(),
        swaps
    );
    if let Some(journal) = journal {
        println!("journal {} written to {}", journal.run_id(), journal.path());
    }
    Ok(())
}

fn describe(plan: &StepPlan) -> String {
    let position = |p: Option<TipPosition>| p.map_or_else(|| "-".to_string(), |p| p.to_string());
    let mut line = format!(
        "{:>4}  {}:{} -> {}  {} uL  tip {} -> {}",
        plan.step,
        plan.source_container,
        plan.source_well,
        plan.destination_well,
        plan.volume,
        position(plan.tip_supply),
        position(plan.tip_placement),
    );
    if plan.needs_new_tip {
        line.push_str("  [new tip]");
    }
    if plan.return_tip {
        line.push_str("  [return tip]");
    }
    if plan.source_changing {
        line.push_str("  [source changes]");
    }
    line
}
