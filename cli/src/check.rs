//! `transfer-seq check` - parse a file and report batches

use anyhow::{bail, Result};
use transfer_sequencer_core_rs::{ParseMode, SequencerConfig, TransferSequencer};

pub fn run_check_command(file: &str, mode: ParseMode) -> Result<()> {
    let config = SequencerConfig {
        mode,
        ..SequencerConfig::default()
    };
    let mut seq = TransferSequencer::new(config)?;
    seq.load_file(file);
    if let Some(err) = seq.last_error() {
        bail!("{}: {}", file, err);
    }

    println!("{} ({} mode): {} operations", file, mode, seq.total_size());
    for (batch, (size, constant)) in seq
        .batch_sizes()
        .iter()
        .zip(seq.batch_volume_constant())
        .enumerate()
    {
        println!(
            "  batch {:>3}: {:>3} transfers, {}",
            batch,
            size,
            if *constant { "constant volume" } else { "mixed volumes" }
        );
    }
    Ok(())
}
