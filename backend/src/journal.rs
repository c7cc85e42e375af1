//! Run journal
//!
//! Append-only CSV audit trail of committed steps, one line per step,
//! written through the text storage collaborator. Every journal carries a
//! run id so lines from several runs appended to one file stay separable.
//!
//! Records are encoded with the `csv` writer, so container names holding
//! commas or quotes stay in a single cell.

use crate::error::SequencerError;
use crate::io::TextStorage;
use crate::rack::TipPosition;
use crate::sequencer::{StepPlan, TipCommit};
use csv::WriterBuilder;
use std::sync::Arc;
use uuid::Uuid;

/// Column names written as the first record of a journal
pub const JOURNAL_COLUMNS: [&str; 10] = [
    "run_id",
    "step",
    "source_container",
    "source_well",
    "volume",
    "destination_well",
    "new_tip",
    "tip_taken",
    "tip_placed",
    "return_tip",
];

/// Encode one record as a CSV line without its terminator
fn encode_record<I, T>(path: &str, fields: I) -> Result<String, SequencerError>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer
        .write_record(fields)
        .map_err(|e| SequencerError::io(path, e))?;
    let bytes = writer
        .into_inner()
        .map_err(|e| SequencerError::io(path, e))?;
    let line = String::from_utf8(bytes).map_err(|e| SequencerError::io(path, e))?;
    Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
}

/// Handle to an open journal file
pub struct RunJournal {
    run_id: Uuid,
    path: String,
    storage: Arc<dyn TextStorage>,
    entries: usize,
}

impl RunJournal {
    /// Start a new journal, replacing any file at `path`
    pub fn create(storage: Arc<dyn TextStorage>, path: &str) -> Result<Self, SequencerError> {
        storage.write(path, &encode_record(path, JOURNAL_COLUMNS)?)?;
        Ok(Self {
            run_id: Uuid::new_v4(),
            path: path.to_string(),
            storage,
            entries: 0,
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Lines appended so far (header excluded)
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Append one committed step
    pub fn record(&mut self, plan: &StepPlan, commit: &TipCommit) -> Result<(), SequencerError> {
        let position = |p: Option<TipPosition>| p.map(|p| p.to_string()).unwrap_or_default();
        let fields = [
            self.run_id.to_string(),
            plan.step.to_string(),
            plan.source_container.to_string(),
            plan.source_well.to_string(),
            plan.volume.to_string(),
            plan.destination_well.to_string(),
            plan.needs_new_tip.to_string(),
            position(commit.taken),
            position(commit.placed),
            plan.return_tip.to_string(),
        ];
        let line = encode_record(&self.path, &fields)?;
        self.storage.append(&self.path, &line)?;
        self.entries += 1;
        Ok(())
    }
}
