// ==========================================
// Fiber-splice billing - table assembler
// ==========================================
// Stage 5: run dedup -> alias resolution -> content guessing over one
// sheet's header + data rows, then project every row onto the six
// canonical fields. All semantic typing happens here; untyped cells
// never leak past this boundary. Coercion failures default the field
// and log a warning, they never abort a row or the table.
// ==========================================

use crate::domain::{CanonicalField, CanonicalRecord, CellValue};
use crate::importer::alias_resolver::resolve_aliases;
use crate::importer::content_guesser::guess_missing;
use crate::importer::header_normalizer::dedup_headers;
use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

/// Datetime formats tried, in order, for text cells. Native
/// spreadsheet datetimes bypass this list.
const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M",
];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y%m%d"];

// ==========================================
// AssembledSheet - one sheet in canonical shape
// ==========================================
#[derive(Debug, Clone)]
pub struct AssembledSheet {
    pub records: Vec<CanonicalRecord>,
    /// Canonical fields that were backed by an actual source column
    /// (as opposed to left at their defaults). Drives the header
    /// strategy fallback and strict schema mode.
    pub resolved: Vec<CanonicalField>,
}

impl AssembledSheet {
    pub fn is_resolved(&self, field: CanonicalField) -> bool {
        self.resolved.contains(&field)
    }
}

/// Assemble one sheet: headers are the (possibly strategy-derived)
/// column labels, rows the remaining data rows. An empty sheet yields
/// an empty result with the canonical schema, never an error.
pub fn assemble(headers: &[String], rows: &[Vec<CellValue>], source_sheet: &str) -> AssembledSheet {
    let deduped = dedup_headers(headers);
    let mut assignment = resolve_aliases(&deduped);

    // Column-major view of the data rows, padded for ragged rows.
    let columns: Vec<Vec<CellValue>> = (0..deduped.len())
        .map(|col| {
            rows.iter()
                .map(|row| row.get(col).cloned().unwrap_or(CellValue::Empty))
                .collect()
        })
        .collect();

    if !rows.is_empty() {
        guess_missing(&mut assignment, &columns);
    }

    let records = rows
        .iter()
        .enumerate()
        .map(|(row_index, row)| project_row(row, &assignment, source_sheet, row_index))
        .collect();

    let resolved = CanonicalField::ALL
        .into_iter()
        .filter(|field| assignment.contains(&Some(*field)))
        .collect();

    AssembledSheet { records, resolved }
}

fn project_row(
    row: &[CellValue],
    assignment: &[Option<CanonicalField>],
    source_sheet: &str,
    row_index: usize,
) -> CanonicalRecord {
    let mut record = CanonicalRecord::empty(source_sheet);

    for (col, field) in assignment.iter().enumerate() {
        let Some(field) = field else { continue };
        let cell = row.get(col).cloned().unwrap_or(CellValue::Empty);
        match field {
            CanonicalField::Type => record.record_type = coerce_text(&cell),
            CanonicalField::Map => record.map = coerce_text(&cell),
            CanonicalField::Splices => {
                record.splices = coerce_splices(&cell, source_sheet, row_index)
            }
            CanonicalField::Device => record.device = coerce_text(&cell),
            CanonicalField::CreatedDate => {
                record.created_date = coerce_datetime(&cell, source_sheet, row_index)
            }
            CanonicalField::Splicer => record.splicer = coerce_text(&cell),
        }
    }

    record
}

// ===== Coercions =====

fn coerce_text(cell: &CellValue) -> Option<String> {
    let text = cell.as_text();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// splices invariant: always a non-negative integer. Absent or
/// unparseable input coerces to 0.
fn coerce_splices(cell: &CellValue, sheet: &str, row: usize) -> i64 {
    match cell.as_f64() {
        Some(value) => (value.trunc() as i64).max(0),
        None => {
            if !cell.is_empty() {
                debug!(sheet, row, value = %cell.as_text(), "splice count not numeric, defaulting to 0");
            }
            0
        }
    }
}

/// Best-effort datetime parsing; failure leaves the field absent,
/// never raises.
fn coerce_datetime(cell: &CellValue, sheet: &str, row: usize) -> Option<NaiveDateTime> {
    match cell {
        CellValue::DateTime(dt) => Some(*dt),
        CellValue::Empty => None,
        other => {
            let text = other.as_text();
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            let parsed = parse_datetime_text(trimmed);
            if parsed.is_none() {
                debug!(sheet, row, value = trimmed, "created_date not parseable, leaving absent");
            }
            parsed
        }
    }
}

fn parse_datetime_text(text: &str) -> Option<NaiveDateTime> {
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}
