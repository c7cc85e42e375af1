//! Dilution tables
//!
//! Two schemas describe the same job: top up each destination well with
//! diluent from a reservoir, then add the sample.
//!
//! - plain: `source_well, sample_volume, destination_well, final_volume`
//! - LIMS export: free-form preamble, then a header row starting with
//!   `Sample Name`; source well in column 3, sample volume in column 6,
//!   destination well in column 8, diluent volume in column 12
//!
//! All diluent transfers come first and share one tip. Every sample gets a
//! fresh tip, except the first one: the diluent tip has only touched clean
//! buffer, so it is reused for the first sample.

use crate::error::SequencerError;
use crate::models::{ContainerId, Operation, Volume, Well};
use crate::parsers::Row;
use lazy_static::lazy_static;
use regex::Regex;

/// Container name of the diluent reservoir
pub const DILUENT_RESERVOIR: &str = "diluent_reservoir";

/// Container name of the sample plate
pub const SAMPLE_PLATE: &str = "sample_plate";

/// Header cell that precedes LIMS data rows
pub const LIMS_HEADER_MARKER: &str = "Sample Name";

lazy_static! {
    /// 96-well coordinates as exported by the LIMS: `C4`, `C04`, `C:4`, `C:04`
    static ref LIMS_WELL: Regex = Regex::new(r"^([A-Ha-h]):?(0?[1-9]|1[0-2])$").expect("valid LIMS well pattern");
}

struct DilutionRow {
    source_well: Well,
    sample_volume: Volume,
    destination_well: Well,
    diluent_volume: Volume,
}

pub(crate) fn parse_dilution_transfers(rows: &[Row]) -> Result<Vec<Operation>, SequencerError> {
    let mut parsed = Vec::with_capacity(rows.len());
    for row in rows {
        let source_well = row.well(0)?;
        let sample_volume = row.volume(1)?;
        let destination_well = row.well(2)?;
        let final_volume = row.volume(3)?;
        let diluent_volume = final_volume.checked_sub(sample_volume).ok_or_else(|| {
            SequencerError::parse(row.line, "diluent volume out of range")
        })?;
        parsed.push(DilutionRow {
            source_well,
            sample_volume,
            destination_well,
            diluent_volume,
        });
    }
    Ok(split_diluent_and_samples(&parsed))
}

pub(crate) fn parse_lims_dilution_transfers(
    rows: &[Row],
) -> Result<Vec<Operation>, SequencerError> {
    let header = rows
        .iter()
        .position(|row| row.record.get(0) == Some(LIMS_HEADER_MARKER))
        .ok_or_else(|| {
            SequencerError::parse(0, format!("header row \"{}\" not found", LIMS_HEADER_MARKER))
        })?;

    let mut parsed = Vec::new();
    for row in &rows[header + 1..] {
        parsed.push(DilutionRow {
            source_well: lims_well(row, 2)?,
            sample_volume: optional_volume(row, 5)?,
            destination_well: lims_well(row, 7)?,
            diluent_volume: optional_volume(row, 11)?,
        });
    }
    Ok(split_diluent_and_samples(&parsed))
}

fn lims_well(row: &Row, index: usize) -> Result<Well, SequencerError> {
    let cell = row.cell(index)?;
    let invalid = || SequencerError::parse(row.line, format!("Invalid coordinates: \"{}\"", cell));
    let captures = LIMS_WELL.captures(cell).ok_or_else(invalid)?;

    let letter = captures[1].chars().next().ok_or_else(invalid)?;
    let row_number = letter.to_ascii_uppercase() as u8 - b'A' + 1;
    let column: u8 = captures[2].parse().map_err(|_| invalid())?;
    Well::new(row_number, column).ok_or_else(invalid)
}

/// An empty cell means nothing to transfer
fn optional_volume(row: &Row, index: usize) -> Result<Volume, SequencerError> {
    if row.cell(index)?.is_empty() {
        Ok(Volume::ZERO)
    } else {
        row.volume(index)
    }
}

fn split_diluent_and_samples(rows: &[DilutionRow]) -> Vec<Operation> {
    let reservoir = ContainerId::new(DILUENT_RESERVOIR);
    let plate = ContainerId::new(SAMPLE_PLATE);

    let mut diluent = Vec::new();
    let mut samples = Vec::new();
    for row in rows {
        if row.sample_volume.is_positive() {
            samples.push((row.source_well, row.sample_volume, row.destination_well));
        }
        if row.diluent_volume.is_positive() {
            diluent.push(Operation::new(
                reservoir.clone(),
                Well::A1,
                row.diluent_volume,
                row.destination_well,
                diluent.is_empty(),
            ));
        }
    }

    let reuse_diluent_tip = !diluent.is_empty();
    let sample_ops = samples
        .into_iter()
        .enumerate()
        .map(|(i, (source, volume, destination))| {
            let new_tip = i > 0 || !reuse_diluent_tip;
            Operation::new(plate.clone(), source, volume, destination, new_tip)
        });

    diluent.extend(sample_ops);
    diluent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::read_records;

    fn plain(text: &str) -> Result<Vec<Operation>, SequencerError> {
        parse_dilution_transfers(&read_records(text).unwrap())
    }

    fn lims(text: &str) -> Result<Vec<Operation>, SequencerError> {
        parse_lims_dilution_transfers(&read_records(text).unwrap())
    }

    #[test]
    fn test_diluent_first_then_samples() {
        let ops = plain("A1,2,A1,10\nB1,3,B1,10\n").unwrap();
        let summary: Vec<(String, String, bool)> = ops
            .iter()
            .map(|op| {
                (
                    op.source_container().to_string(),
                    op.volume().to_string(),
                    op.prefer_new_tip(),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                (DILUENT_RESERVOIR.to_string(), "8".to_string(), true),
                (DILUENT_RESERVOIR.to_string(), "7".to_string(), false),
                (SAMPLE_PLATE.to_string(), "2".to_string(), false),
                (SAMPLE_PLATE.to_string(), "3".to_string(), true),
            ]
        );
        assert_eq!(ops[0].source_well().to_string(), "A1");
        assert_eq!(ops[1].destination_well().to_string(), "B1");
    }

    #[test]
    fn test_no_diluent_means_first_sample_takes_new_tip() {
        let ops = plain("A1,10,A1,10\nB1,10,B1,10\n").unwrap();
        assert_eq!(ops.len(), 2);
        assert!(ops.iter().all(|op| op.prefer_new_tip()));
    }

    #[test]
    fn test_diluent_volume_rounded() {
        let ops = plain("A1,1.1,A1,3.3\n").unwrap();
        assert_eq!(ops[0].volume().thousandths(), 2_200);
    }

    #[test]
    fn test_huge_volumes_are_parse_errors() {
        assert!(matches!(
            plain("A1,2,A1,10\nA1,-1e300,A1,1e300\n"),
            Err(SequencerError::Parse { line: 2, .. })
        ));
        // Largest accepted magnitudes still subtract exactly; negative sample dropped
        let ops = plain("A1,-1000000000,A1,1000000000\n").unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].volume().thousandths(), 2_000_000_000_000);
    }

    #[test]
    fn test_lims_rows_after_header() {
        let text = "\
Normalization,,,,,,,,,,,
Sample Name,Container,Well,Conc,Target,Sample Vol,Dest,Dest Well,x,y,z,Buffer Vol
S1,C1,A:01,5,1,2.5,P1,B:02,,,,7.5
S2,C1,H12,5,1,,P1,C3,,,,
S3,C1,b2,5,1,4,P1,D04,,,,0
";
        let ops = lims(text).unwrap();
        assert_eq!(ops.len(), 3);
        assert_eq!(ops[0].source_container(), &ContainerId::new(DILUENT_RESERVOIR));
        assert_eq!(ops[0].volume().to_string(), "7.5");
        assert_eq!(ops[0].destination_well().to_string(), "B2");
        assert_eq!(ops[1].source_well().to_string(), "A1");
        assert!(!ops[1].prefer_new_tip());
        assert_eq!(ops[2].source_well().to_string(), "B2");
        assert_eq!(ops[2].destination_well().to_string(), "D4");
        assert!(ops[2].prefer_new_tip());
    }

    #[test]
    fn test_lims_rejects_384_well_coordinates() {
        let text = "Sample Name,a,b,c,d,e,f,g,h,i,j,k\nS1,C,I1,0,0,1,P,A1,,,,1\n";
        assert!(matches!(lims(text), Err(SequencerError::Parse { line: 2, .. })));
    }

    #[test]
    fn test_lims_missing_header() {
        assert!(matches!(
            lims("S1,C1,A1,5,1,2.5,P1,B2,,,,7.5\n"),
            Err(SequencerError::Parse { .. })
        ));
    }

    #[test]
    fn test_lims_non_numeric_volume() {
        let text = "Sample Name,a,b,c,d,e,f,g,h,i,j,k\nS1,C,A1,0,0,n/a,P,A1,,,,1\n";
        assert!(matches!(lims(text), Err(SequencerError::Parse { line: 2, .. })));
    }
}
