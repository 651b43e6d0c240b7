// ==========================================
// Fiber-splice billing - record domain model
// ==========================================
// Raw tabular input stays untyped (CellValue) until the assembler
// projects it onto the canonical record shape. Nothing downstream of
// the assembler ever sees raw cells.
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical export/input column order, stable across versions.
pub const CANONICAL_COLUMNS: [&str; 6] = [
    "type",
    "map",
    "splices",
    "device",
    "created_date",
    "splicer",
];

// ==========================================
// CellValue - untyped spreadsheet cell
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// A cell counts as empty when it is `Empty` or blank text.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Display form used by header derivation and content scoring.
    /// Whole-number floats render without a trailing `.0`.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Bool(b) => b.to_string(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Numeric view of the cell, if any. Text is parsed after trimming;
    /// booleans and datetimes do not coerce.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }
}

// ==========================================
// RawSheet - one sheet/source as a raw grid
// ==========================================
// Produced by the table loader with no semantic interpretation;
// header strategies decide later which rows are labels and which
// are data.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    pub name: String,
    pub grid: Vec<Vec<CellValue>>,
}

impl RawSheet {
    pub fn new(name: impl Into<String>, grid: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            grid,
        }
    }

    /// Widest row in the grid (rows may be ragged).
    pub fn width(&self) -> usize {
        self.grid.iter().map(|row| row.len()).max().unwrap_or(0)
    }
}

// ==========================================
// CanonicalField - the six meaningful columns
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CanonicalField {
    Type,
    Map,
    Splices,
    Device,
    CreatedDate,
    Splicer,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 6] = [
        CanonicalField::Type,
        CanonicalField::Map,
        CanonicalField::Splices,
        CanonicalField::Device,
        CanonicalField::CreatedDate,
        CanonicalField::Splicer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Type => "type",
            CanonicalField::Map => "map",
            CanonicalField::Splices => "splices",
            CanonicalField::Device => "device",
            CanonicalField::CreatedDate => "created_date",
            CanonicalField::Splicer => "splicer",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// CanonicalRecord - one assembled work record
// ==========================================
// Invariant: splices is always a non-negative integer; absent or
// unparseable input coerces to 0, never to null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    #[serde(rename = "type")]
    pub record_type: Option<String>,
    pub map: Option<String>,
    pub splices: i64,
    pub device: Option<String>,
    pub created_date: Option<NaiveDateTime>,
    pub splicer: Option<String>,
    pub source_sheet: String,
}

impl CanonicalRecord {
    /// All-default record for a sheet, before any column is filled in.
    pub fn empty(source_sheet: impl Into<String>) -> Self {
        Self {
            record_type: None,
            map: None,
            splices: 0,
            device: None,
            created_date: None,
            splicer: None,
            source_sheet: source_sheet.into(),
        }
    }
}

// ==========================================
// PricedRecord - persisted-record shape
// ==========================================
// Handed to the storage collaborator, which owns it thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedRecord {
    #[serde(flatten)]
    pub record: CanonicalRecord,
    pub splice_charge: f64,
    pub device_charge: f64,
    pub total: f64,
}

// ==========================================
// ImportSummary - one ingestion batch
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub batch_id: String,
    pub file_name: String,
    pub sheet_count: usize,
    pub total_rows: usize,
    pub total_amount: f64,
    pub elapsed_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_as_text_whole_number() {
        assert_eq!(CellValue::Number(10.0).as_text(), "10");
        assert_eq!(CellValue::Number(2.5).as_text(), "2.5");
        assert_eq!(CellValue::Empty.as_text(), "");
    }

    #[test]
    fn test_cell_as_f64_from_text() {
        assert_eq!(CellValue::Text(" 42 ".to_string()).as_f64(), Some(42.0));
        assert_eq!(CellValue::Text("abc".to_string()).as_f64(), None);
        assert_eq!(CellValue::Bool(true).as_f64(), None);
    }

    #[test]
    fn test_canonical_columns_order() {
        assert_eq!(
            CANONICAL_COLUMNS,
            ["type", "map", "splices", "device", "created_date", "splicer"]
        );
        for (field, name) in CanonicalField::ALL.iter().zip(CANONICAL_COLUMNS) {
            assert_eq!(field.as_str(), name);
        }
    }

    #[test]
    fn test_empty_record_defaults() {
        let rec = CanonicalRecord::empty("Sheet1");
        assert_eq!(rec.splices, 0);
        assert!(rec.record_type.is_none());
        assert!(rec.created_date.is_none());
        assert_eq!(rec.source_sheet, "Sheet1");
    }
}
