// Small dev utility: ingest one spreadsheet/CSV of splice work records
// and persist the priced batch.
//
// Usage:
//   cargo run --bin import_workbook -- <file> [db_path]
//
// Seeds a default tariff (two tiers + ONT device type) when the
// configuration tables are empty, so a fresh database prices something
// sensible.

use splice_billing::repository::BillingRepositoryImpl;
use splice_billing::{logging, BillingRepository, WorkRecordImporter};
use std::fs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let file_path = args.next().ok_or("usage: import_workbook <file> [db_path]")?;
    let db_path = args.next().unwrap_or_else(|| "splice_billing.db".to_string());

    let repo = BillingRepositoryImpl::new(&db_path)?;

    if repo.lookup_splice_tiers()?.is_empty() {
        repo.insert_splice_tier(0, Some(10), 2.0)?;
        repo.insert_splice_tier(11, None, 1.5)?;
        repo.upsert_device_type("ONT", 15.0)?;
        println!("seeded default tariff into {db_path}");
    }

    let bytes = fs::read(&file_path)?;
    let snapshot = repo.load_tariff_snapshot()?;
    let importer = WorkRecordImporter::new(snapshot);

    let summary = importer.ingest_and_save(&bytes, &file_path, &repo)?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    println!("records in database: {}", repo.record_count()?);

    Ok(())
}
