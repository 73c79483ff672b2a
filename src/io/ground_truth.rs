//! Ground-truth rectangle records: one rectangle per line, four integer
//! fields (x, y, width, height) separated by comma or tab.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

use crate::tracker::Rect;

#[derive(Debug, Error)]
pub enum GroundTruthError {
    #[error("failed to read ground truth file")]
    Io(#[from] std::io::Error),
    #[error("line {line}: invalid rectangle field {field:?}")]
    InvalidField { line: usize, field: String },
    #[error("line {line}: expected 4 fields, found {found}")]
    TruncatedRecord { line: usize, found: usize },
}

/// Parse one record line into a rectangle.
///
/// Fields are split on `,` and tab; empty segments are skipped. A line with
/// no fields at all yields `None`, meaning "no rectangle for this frame".
pub fn parse_rect_line(line: &str, line_no: usize) -> Result<Option<Rect>, GroundTruthError> {
    let mut fields = Vec::new();
    for segment in line.split(|c| c == ',' || c == '\t') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let value: i32 = segment
            .parse()
            .map_err(|_| GroundTruthError::InvalidField {
                line: line_no,
                field: segment.to_string(),
            })?;
        fields.push(value);
    }

    if fields.is_empty() {
        return Ok(None);
    }
    if fields.len() < 4 {
        return Err(GroundTruthError::TruncatedRecord {
            line: line_no,
            found: fields.len(),
        });
    }
    Ok(Some(Rect::new(
        fields[0] as f32,
        fields[1] as f32,
        fields[2] as f32,
        fields[3] as f32,
    )))
}

/// Load a whole ground-truth file, one entry per line.
pub fn load_ground_truth<P: AsRef<Path>>(path: P) -> Result<Vec<Option<Rect>>, GroundTruthError> {
    let reader = BufReader::new(File::open(path)?);
    let mut rects = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        rects.push(parse_rect_line(&line?, i + 1)?);
    }
    log::debug!("loaded {} ground truth records", rects.len());
    Ok(rects)
}
