// ==========================================
// Fiber-splice billing - work-record importer
// ==========================================
// Orchestrates one ingestion: load -> header strategies -> assemble
// -> price -> (optionally) persist. One call is one self-contained,
// synchronous computation; the tariff snapshot is captured by the
// caller before the pipeline runs and is never re-read mid-batch.
// ==========================================

use crate::domain::{
    CanonicalField, CanonicalRecord, ImportSummary, PricedRecord, RawSheet, TariffSnapshot,
};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::strategy::{assemble_with_fallback, HeaderStrategy, REQUIRED_FIELDS};
use crate::importer::table_assembler::assemble;
use crate::importer::table_loader::load_sheets;
use crate::pricing::PricingEngine;
use crate::repository::BillingRepository;
use std::time::Instant;
use tracing::{info, instrument};
use uuid::Uuid;

// ==========================================
// SchemaMode - required-column handling
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaMode {
    /// Absent fields keep their defaults after all strategies are
    /// exhausted (the default behavior).
    Lenient,
    /// Fixed-schema deployments: every sheet must resolve
    /// type/map/splices/device or the whole ingestion fails.
    Strict,
}

// ==========================================
// WorkRecordImporter
// ==========================================
pub struct WorkRecordImporter {
    tariff: TariffSnapshot,
    schema_mode: SchemaMode,
}

impl WorkRecordImporter {
    pub fn new(tariff: TariffSnapshot) -> Self {
        Self {
            tariff,
            schema_mode: SchemaMode::Lenient,
        }
    }

    pub fn with_schema_mode(tariff: TariffSnapshot, schema_mode: SchemaMode) -> Self {
        Self {
            tariff,
            schema_mode,
        }
    }

    /// Ingest one uploaded payload into priced records, in sheet order
    /// then row order. Fails only on container-level errors, or on an
    /// unresolved required column set in strict mode; everything else
    /// degrades to per-field defaults.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub fn ingest(&self, bytes: &[u8], filename: &str) -> ImportResult<Vec<PricedRecord>> {
        let sheets = load_sheets(bytes, filename)?;
        let is_workbook = !filename.to_lowercase().ends_with(".csv");
        self.ingest_sheets(&sheets, is_workbook)
    }

    /// Pipeline over already-loaded raw sheets. Workbook sheets get the
    /// full header-strategy fallback; CSV input is always first-row
    /// headed.
    pub fn ingest_sheets(
        &self,
        sheets: &[RawSheet],
        is_workbook: bool,
    ) -> ImportResult<Vec<PricedRecord>> {
        let mut records: Vec<CanonicalRecord> = Vec::new();

        for sheet in sheets {
            let assembled = if is_workbook {
                assemble_with_fallback(sheet)
            } else {
                let (labels, rows) = HeaderStrategy::FirstRow.split(sheet);
                assemble(&labels, rows, &sheet.name)
            };

            if self.schema_mode == SchemaMode::Strict {
                let missing: Vec<CanonicalField> = REQUIRED_FIELDS
                    .into_iter()
                    .filter(|field| !assembled.is_resolved(*field))
                    .collect();
                if !missing.is_empty() {
                    return Err(ImportError::MissingColumns(missing));
                }
            }

            records.extend(assembled.records);
        }

        let engine = PricingEngine::new(&self.tariff);
        Ok(records
            .into_iter()
            .map(|record| engine.price(record))
            .collect())
    }

    /// Ingest and persist in one step: all rows land in storage or none
    /// do. Returns the batch summary for the caller's presentation
    /// layer.
    #[instrument(skip(self, bytes, repo))]
    pub fn ingest_and_save(
        &self,
        bytes: &[u8],
        filename: &str,
        repo: &dyn BillingRepository,
    ) -> ImportResult<ImportSummary> {
        let started = Instant::now();

        let sheets = load_sheets(bytes, filename)?;
        let is_workbook = !filename.to_lowercase().ends_with(".csv");
        let rows = self.ingest_sheets(&sheets, is_workbook)?;

        repo.save_records(&rows)?;

        let summary = ImportSummary {
            batch_id: Uuid::new_v4().to_string(),
            file_name: filename.to_string(),
            sheet_count: sheets.len(),
            total_rows: rows.len(),
            total_amount: crate::pricing::round_half_up_2(
                rows.iter().map(|r| r.total).sum::<f64>(),
            ),
            elapsed_ms: started.elapsed().as_millis() as i64,
        };

        info!(
            batch_id = %summary.batch_id,
            rows = summary.total_rows,
            sheets = summary.sheet_count,
            total = summary.total_amount,
            elapsed_ms = summary.elapsed_ms,
            "ingestion batch saved"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BillingPolicy, CellValue, DeviceType, SpliceTier};

    fn tariff() -> TariffSnapshot {
        TariffSnapshot::new(
            vec![DeviceType {
                name: "ONT".to_string(),
                unit_value: 15.0,
            }],
            vec![
                SpliceTier {
                    min_splices: 0,
                    max_splices: Some(10),
                    unit_price: 2.0,
                },
                SpliceTier {
                    min_splices: 11,
                    max_splices: None,
                    unit_price: 1.5,
                },
            ],
            BillingPolicy::ChargeAll,
        )
    }

    fn text_row(values: &[&str]) -> Vec<CellValue> {
        values.iter().map(|v| CellValue::Text(v.to_string())).collect()
    }

    fn sheet(name: &str, rows: usize) -> RawSheet {
        let mut grid = vec![text_row(&["Tipo", "Mapa", "Qtd Fusoes", "Dispositivo"])];
        for i in 0..rows {
            grid.push(text_row(&[
                "Splice",
                "Rua A, Rua B",
                &i.to_string(),
                "ONT-1234",
            ]));
        }
        RawSheet::new(name, grid)
    }

    #[test]
    fn test_csv_ingest_end_to_end() {
        let importer = WorkRecordImporter::new(tariff());
        let payload = b"Tipo,Qtd Fusoes,Dispositivo\nONT,15,ONT\n";
        let rows = importer.ingest(payload, "upload.csv").unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].record.splices, 15);
        assert_eq!(rows[0].splice_charge, 22.5);
        assert_eq!(rows[0].device_charge, 15.0);
        assert_eq!(rows[0].total, 37.5);
    }

    #[test]
    fn test_sheet_concatenation_preserves_order() {
        // k sheets with r1..rk rows concatenate to exactly sum(ri)
        // canonical rows, sheet order then row order.
        let sheets = vec![sheet("A", 3), sheet("B", 1), sheet("C", 2)];
        let importer = WorkRecordImporter::new(tariff());
        let rows = importer.ingest_sheets(&sheets, true).unwrap();

        assert_eq!(rows.len(), 6);
        let sources: Vec<&str> = rows.iter().map(|r| r.record.source_sheet.as_str()).collect();
        assert_eq!(sources, vec!["A", "A", "A", "B", "C", "C"]);
        assert_eq!(rows[0].record.splices, 0);
        assert_eq!(rows[2].record.splices, 2);
    }

    #[test]
    fn test_empty_workbook_yields_zero_rows() {
        let importer = WorkRecordImporter::new(tariff());
        let rows = importer.ingest_sheets(&[], true).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_strict_mode_reports_missing_fields() {
        let importer = WorkRecordImporter::with_schema_mode(tariff(), SchemaMode::Strict);
        // type + splices only; no strategy can resolve map or device
        let sheets = vec![RawSheet::new(
            "A",
            vec![
                text_row(&["Tipo", "Qtd Fusoes"]),
                text_row(&["Splice", "4"]),
                text_row(&["Splice", "6"]),
            ],
        )];
        let err = importer.ingest_sheets(&sheets, true).unwrap_err();
        match err {
            ImportError::MissingColumns(missing) => {
                assert!(missing.contains(&CanonicalField::Device));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unsupported_extension_aborts() {
        let importer = WorkRecordImporter::new(tariff());
        let err = importer.ingest(b"data", "records.pdf").unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(_)));
    }
}
