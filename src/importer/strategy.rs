// ==========================================
// Fiber-splice billing - header-row strategies
// ==========================================
// Workbook header rows are sometimes doubled (a caption row above the
// real header) or offset by one row. An explicit ordered strategy
// list replaces trial-and-error: each strategy derives labels + data
// rows, runs the full assembly pipeline, and reports whether it
// satisfied the required field set. The first satisfied result wins;
// otherwise the last attempt is returned and absent fields keep
// their defaults.
// ==========================================

use crate::domain::{CanonicalField, CellValue, RawSheet};
use crate::importer::table_assembler::{assemble, AssembledSheet};
use tracing::debug;

/// Canonical fields a strategy must resolve to be accepted.
pub const REQUIRED_FIELDS: [CanonicalField; 4] = [
    CanonicalField::Type,
    CanonicalField::Map,
    CanonicalField::Splices,
    CanonicalField::Device,
];

// ==========================================
// HeaderStrategy - where the labels live
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStrategy {
    /// First row as header.
    FirstRow,
    /// Two-row header, flattened by joining the non-empty,
    /// non-placeholder parts of each column's row pair with a space.
    TwoRowFlattened,
    /// Second row as header; row 0 is a caption and is skipped.
    SecondRow,
    /// Positional column labels; content guessing does all the work.
    Positional,
}

/// Attempt order for workbook sheets. CSV input uses FirstRow only.
pub const WORKBOOK_STRATEGIES: [HeaderStrategy; 4] = [
    HeaderStrategy::FirstRow,
    HeaderStrategy::TwoRowFlattened,
    HeaderStrategy::SecondRow,
    HeaderStrategy::Positional,
];

impl HeaderStrategy {
    /// Split a raw grid into (column labels, data rows) under this
    /// strategy. Sheets shorter than the strategy's header depth yield
    /// no data rows rather than failing.
    pub fn split<'a>(&self, sheet: &'a RawSheet) -> (Vec<String>, &'a [Vec<CellValue>]) {
        let width = sheet.width();
        let grid = &sheet.grid;
        match self {
            HeaderStrategy::FirstRow => {
                let labels = row_labels(grid.first(), width);
                (labels, grid.get(1..).unwrap_or(&[]))
            }
            HeaderStrategy::TwoRowFlattened => {
                let labels = flatten_label_pair(grid.first(), grid.get(1), width);
                (labels, grid.get(2..).unwrap_or(&[]))
            }
            HeaderStrategy::SecondRow => {
                let labels = row_labels(grid.get(1), width);
                (labels, grid.get(2..).unwrap_or(&[]))
            }
            HeaderStrategy::Positional => (positional_labels(width), grid.as_slice()),
        }
    }
}

/// Assemble one workbook sheet, trying strategies in order until one
/// resolves all required fields. Degrades gracefully: when none
/// qualifies, the last attempt's result is returned.
pub fn assemble_with_fallback(sheet: &RawSheet) -> AssembledSheet {
    let mut last: Option<AssembledSheet> = None;

    for strategy in WORKBOOK_STRATEGIES {
        let (labels, rows) = strategy.split(sheet);
        let assembled = assemble(&labels, rows, &sheet.name);
        let satisfied = REQUIRED_FIELDS
            .iter()
            .all(|field| assembled.is_resolved(*field));

        if satisfied {
            debug!(sheet = %sheet.name, ?strategy, "header strategy accepted");
            return assembled;
        }
        last = Some(assembled);
    }

    debug!(sheet = %sheet.name, "no header strategy resolved all required fields, keeping last attempt");
    // WORKBOOK_STRATEGIES is non-empty, so a last attempt always exists.
    last.unwrap_or(AssembledSheet {
        records: Vec::new(),
        resolved: Vec::new(),
    })
}

fn row_labels(row: Option<&Vec<CellValue>>, width: usize) -> Vec<String> {
    (0..width)
        .map(|col| {
            let label = row
                .and_then(|r| r.get(col))
                .map(|c| c.as_text().trim().to_string())
                .unwrap_or_default();
            if label.is_empty() {
                positional_label(col)
            } else {
                label
            }
        })
        .collect()
}

fn flatten_label_pair(
    top: Option<&Vec<CellValue>>,
    bottom: Option<&Vec<CellValue>>,
    width: usize,
) -> Vec<String> {
    (0..width)
        .map(|col| {
            let parts: Vec<String> = [top, bottom]
                .iter()
                .filter_map(|row| row.and_then(|r| r.get(col)))
                .map(|c| c.as_text().trim().to_string())
                .filter(|part| !is_placeholder(part))
                .collect();
            if parts.is_empty() {
                positional_label(col)
            } else {
                parts.join(" ")
            }
        })
        .collect()
}

/// Labels that carry no header information: blanks and the auto
/// captions some exporters generate for unnamed columns.
fn is_placeholder(part: &str) -> bool {
    part.is_empty() || part.to_lowercase().starts_with("unnamed")
}

fn positional_label(col: usize) -> String {
    format!("column_{}", col + 1)
}

fn positional_labels(width: usize) -> Vec<String> {
    (0..width).map(positional_label).collect()
}
