// ==========================================
// Fiber-splice billing - table loader
// ==========================================
// Stage 1: raw payload -> one RawSheet per worksheet (or one for CSV).
// Original labels and cell values are preserved untouched; header
// interpretation happens later in the strategy layer.
// Supported: Excel (.xlsx/.xls) / CSV (.csv)
// ==========================================

use crate::domain::{CellValue, RawSheet};
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::ReaderBuilder;
use std::io::Cursor;

/// Sheet name assigned to CSV payloads, which have no workbook structure.
const CSV_SOURCE_NAME: &str = "csv";

/// Load a raw payload into ordered raw sheets, dispatching on the
/// filename extension. An empty workbook yields an empty vec, not an
/// error; an unsupported or missing extension is a parse error.
pub fn load_sheets(bytes: &[u8], filename: &str) -> ImportResult<Vec<RawSheet>> {
    match extension_of(filename).as_deref() {
        Some("csv") => Ok(vec![load_csv(bytes, filename)?]),
        Some("xlsx") | Some("xls") => load_workbook(bytes),
        Some(other) => Err(ImportError::UnsupportedFormat(other.to_string())),
        None => Err(ImportError::UnsupportedFormat(filename.to_string())),
    }
}

/// Lower-cased extension, or None when the filename has no dot.
fn extension_of(filename: &str) -> Option<String> {
    if !filename.contains('.') {
        return None;
    }
    filename
        .rsplit('.')
        .next()
        .filter(|ext| !ext.is_empty())
        .map(|ext| ext.to_lowercase())
}

fn load_csv(bytes: &[u8], filename: &str) -> ImportResult<RawSheet> {
    // Headers are read as a plain first row; the header strategy layer
    // decides what a label row is.
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut grid = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row: Vec<CellValue> = record
            .iter()
            .map(|field| {
                let trimmed = field.trim();
                if trimmed.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(trimmed.to_string())
                }
            })
            .collect();

        // Skip fully blank rows
        if row.iter().all(CellValue::is_empty) {
            continue;
        }
        grid.push(row);
    }

    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .and_then(|base| base.rsplit_once('.'))
        .map(|(stem, _)| stem)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(CSV_SOURCE_NAME)
        .to_string();

    Ok(RawSheet::new(name, grid))
}

fn load_workbook(bytes: &[u8]) -> ImportResult<Vec<RawSheet>> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = open_workbook_auto_from_rs(cursor)
        .map_err(|e| ImportError::ExcelParse(e.to_string()))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(sheet_names.len());

    for sheet_name in sheet_names {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::ExcelParse(e.to_string()))?;

        let mut grid = Vec::new();
        for row in range.rows() {
            let cells: Vec<CellValue> = row.iter().map(cell_from_data).collect();
            if cells.iter().all(CellValue::is_empty) {
                continue;
            }
            grid.push(cells);
        }

        sheets.push(RawSheet::new(sheet_name, grid));
    }

    Ok(sheets)
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(trimmed.to_string())
            }
        }
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => CellValue::DateTime(naive),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}
