// ==========================================
// Fiber-splice billing - import error types
// ==========================================
// Tool: thiserror derive macro
// Policy: only container-level failures abort an ingestion; per-cell
// coercion failures default the field and are logged, never raised.
// ==========================================

use crate::domain::CanonicalField;
use thiserror::Error;

/// Import module error type
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== File / container errors (parse errors) =====
    #[error("unsupported file format: {0} (expected .xlsx/.xls/.csv)")]
    UnsupportedFormat(String),

    #[error("file read failed: {0}")]
    FileReadError(String),

    #[error("Excel workbook could not be decoded: {0}")]
    ExcelParse(String),

    #[error("CSV payload could not be decoded: {0}")]
    CsvParse(String),

    // ===== Schema errors =====
    #[error(
        "required canonical columns unresolved after all header strategies: [{}]",
        format_fields(.0)
    )]
    MissingColumns(Vec<CanonicalField>),

    // ===== Database errors =====
    #[error("database connection failed: {0}")]
    DatabaseConnection(String),

    #[error("database transaction failed: {0}")]
    DatabaseTransaction(String),

    #[error("database query failed: {0}")]
    DatabaseQuery(String),

    // ===== Configuration errors =====
    #[error("invalid configuration value (key: {key}, value: {value}): {message}")]
    ConfigValue {
        key: String,
        value: String,
        message: String,
    },

    // ===== Catch-all =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn format_fields(fields: &[CanonicalField]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParse(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParse(err.to_string())
    }
}

impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        ImportError::DatabaseQuery(err.to_string())
    }
}

/// Result alias for the import pipeline
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_lists_field_names() {
        let err = ImportError::MissingColumns(vec![
            CanonicalField::Map,
            CanonicalField::Splices,
        ]);
        let msg = err.to_string();
        assert!(msg.contains("map, splices"), "{}", msg);
    }
}
