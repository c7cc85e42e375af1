//! Plain transfer tables
//!
//! Format: `source_container, source_well, volume, destination_well`.
//! Output is sorted by container, then source well column, then row, so
//! that each source plate is visited once. Every operation prefers a fresh
//! tip.

use crate::error::SequencerError;
use crate::models::{ContainerId, Operation};
use crate::parsers::Row;

pub(crate) fn parse_transfers(rows: &[Row]) -> Result<Vec<Operation>, SequencerError> {
    let mut operations = Vec::with_capacity(rows.len());
    for row in rows {
        let container = ContainerId::new(row.cell(0)?);
        let source_well = row.well(1)?;
        let volume = row.volume(2)?;
        let destination_well = row.well(3)?;

        if volume.is_positive() {
            operations.push(Operation::new(
                container,
                source_well,
                volume,
                destination_well,
                true,
            ));
        }
    }

    // Stable: identical source wells keep their file order
    operations.sort_by(|a, b| {
        a.source_container()
            .cmp(b.source_container())
            .then_with(|| {
                a.source_well()
                    .column_major_key()
                    .cmp(&b.source_well().column_major_key())
            })
    });

    Ok(operations)
}
